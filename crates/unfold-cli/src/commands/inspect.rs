use super::read_molecule;
use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use molunfold::core::graph::MoleculeGraph;
use molunfold::core::io::model_file::ModelFile;
use molunfold::core::torsion::catalogue::TorsionCatalogue;
use molunfold::engine::builder::EnergyModel;
use std::fmt::Write;

pub async fn run(args: InspectArgs) -> Result<()> {
    let report = tokio::task::block_in_place(|| execute(&args))?;
    print!("{}", report);
    Ok(())
}

/// Renders the inspection report for the requested input.
pub fn execute(args: &InspectArgs) -> Result<String> {
    match &args.model {
        Some(path) => {
            let file = ModelFile::read_from_path(path).map_err(|e| CliError::parsing(path, e))?;
            let model = EnergyModel::from_file(file)?;
            Ok(render_model(&model))
        }
        None => {
            let (molecule, _) = read_molecule(&args.input)?;
            let graph = MoleculeGraph::build(&molecule);
            let catalogue = TorsionCatalogue::build(&graph, args.max_m);
            Ok(render_catalogue(molecule.name(), &catalogue))
        }
    }
}

fn render_catalogue(name: &str, catalogue: &TorsionCatalogue) -> String {
    let mut out = String::new();
    let bonds = catalogue.bonds();
    let _ = writeln!(out, "Molecule: {}", name);
    let _ = writeln!(out, "Rotatable bonds: {}", bonds.len());
    for (i, bond) in bonds.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>3}. {:<12} score {:>10.4}  fragments {} | {}",
            i + 1,
            bond.name,
            bond.score,
            bond.fragment_0.len(),
            bond.fragment_1.len()
        );
    }

    for level in 1..=catalogue.max_level() {
        let groups = catalogue.groups(level);
        let _ = writeln!(out, "Level {}: {} group(s)", level, groups.len());
        for group in groups {
            let _ = writeln!(
                out,
                "  {:<24} score {:>10.4}  sides {} | {}",
                group.name,
                group.score,
                group.side_0.len(),
                group.side_1.len()
            );
        }
    }
    out
}

fn render_model(model: &EnergyModel) -> String {
    let mut out = String::new();
    let stats = &model.stats;
    let _ = writeln!(out, "Molecule: {}", model.molecule);
    let _ = writeln!(out, "Parameters: {}", model.params);
    let _ = writeln!(out, "Effective M: {}", model.effective_m);
    let _ = writeln!(out, "Bonds: {}", model.mapping.bond_names().join(", "));
    let _ = writeln!(out, "Rotation groups: {}", model.groups.len());
    let _ = writeln!(
        out,
        "Variables: {} torsion, {} auxiliary",
        stats.variable_count, stats.auxiliary_count
    );
    let _ = writeln!(
        out,
        "Terms: {} HUBO (max degree {}), {} QUBO",
        stats.hubo_terms, stats.max_degree, stats.qubo_terms
    );
    let _ = writeln!(out, "QUBO degree histogram:");
    for (degree, count) in model.qubo.degree_histogram() {
        let _ = writeln!(out, "  degree {}: {}", degree, count);
    }
    if model.is_degenerate() {
        let _ = writeln!(out, "Warning: the model has no rotatable bonds.");
    }
    out
}
