use super::read_molecule;
use crate::cli::ReconstructArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use molunfold::core::io::model_file::ModelFile;
use molunfold::core::io::mol2::Mol2File;
use molunfold::core::io::samples::read_samples_from_path;
use molunfold::core::io::traits::MolecularFile;
use molunfold::engine::builder::EnergyModel;
use molunfold::engine::progress::ProgressReporter;
use molunfold::engine::state::{Anomaly, ChosenTorsion, Fallback};
use molunfold::workflows;
use molunfold::workflows::reconstruct::ReconstructionResult;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Machine-readable summary written next to the unfolded molecule.
#[derive(Debug, Serialize)]
struct ReconstructionReport<'a> {
    molecule: &'a str,
    model: String,
    gain: f64,
    feasible: bool,
    fallback: Option<Fallback>,
    sample_rank: Option<usize>,
    inspected: usize,
    model_energy: Option<f64>,
    torsions: &'a [ChosenTorsion],
    anomalies: &'a [Anomaly],
}

pub async fn run(args: ReconstructArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = tokio::task::block_in_place(|| execute(&args, &reporter))?;
    let reconstruction = &result.reconstruction;

    match reconstruction.fallback {
        Some(fallback) => println!(
            "Warning: kept the input conformation ({}). Written to: {}",
            fallback,
            args.output.display()
        ),
        None => println!(
            "✓ Unfolded conformation (gain {:.4}) written to: {}",
            reconstruction.gain,
            args.output.display()
        ),
    }
    for anomaly in &reconstruction.anomalies {
        println!("  Note: {}", anomaly);
    }
    Ok(())
}

pub fn execute(args: &ReconstructArgs, reporter: &ProgressReporter) -> Result<ReconstructionResult> {
    let config = PartialConfig::load(args.config.as_deref())?.merge_reconstruction(args)?;
    let (molecule, metadata) = read_molecule(&args.input)?;

    info!("Loading model from {:?}", &args.model);
    let file = ModelFile::read_from_path(&args.model).map_err(|e| CliError::parsing(&args.model, e))?;
    let model = EnergyModel::from_file(file)?;

    info!("Loading samples from {:?}", &args.samples);
    let samples =
        read_samples_from_path(&args.samples).map_err(|e| CliError::parsing(&args.samples, e))?;
    if samples.is_empty() {
        warn!("The sample table is empty.");
    }

    let result = workflows::reconstruct::run(&molecule, &model, &samples, &config, reporter)?;

    Mol2File::write_to_path(&result.molecule, &metadata, &args.output)
        .map_err(|e| CliError::writing(&args.output, e))?;

    if let Some(path) = &args.report {
        let reconstruction = &result.reconstruction;
        let report = ReconstructionReport {
            molecule: result.molecule.name(),
            model: model.key().to_string(),
            gain: reconstruction.gain,
            feasible: reconstruction.feasible,
            fallback: reconstruction.fallback,
            sample_rank: reconstruction.sample_rank,
            inspected: reconstruction.inspected,
            model_energy: result.model_energy,
            torsions: &reconstruction.torsions,
            anomalies: &reconstruction.anomalies,
        };
        let json = serde_json::to_string_pretty(&report).map_err(|e| CliError::writing(path, e))?;
        std::fs::write(path, json).map_err(|e| CliError::writing(path, e))?;
        info!("Wrote reconstruction report to {:?}", path);
    }

    Ok(result)
}
