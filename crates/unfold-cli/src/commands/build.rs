use super::read_molecule;
use crate::cli::BuildArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use molunfold::engine::builder::EnergyModel;
use molunfold::engine::cache::ModelCache;
use molunfold::engine::progress::ProgressReporter;
use molunfold::workflows;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: BuildArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let written = tokio::task::block_in_place(|| execute(&args, &reporter))?;

    println!(
        "✓ Wrote {} model file(s) to {}",
        written.len(),
        args.output_dir.display()
    );
    Ok(())
}

/// Builds every model of the configured grid and writes one file per distinct model.
pub fn execute(args: &BuildArgs, reporter: &ProgressReporter) -> Result<Vec<PathBuf>> {
    let config = PartialConfig::load(args.config.as_deref())?.merge_build(args)?;
    info!(
        m = ?config.m_values,
        d = ?config.d_values,
        a = ?config.a_values,
        hq = ?config.hq_values,
        "Resolved parameter grid."
    );

    let (molecule, _) = read_molecule(&args.input)?;
    std::fs::create_dir_all(&args.output_dir)?;

    let cache = ModelCache::new();
    let result = workflows::build::run(&molecule, &config, &cache, reporter)?;
    if result.rotatable_bonds == 0 {
        println!("Warning: the molecule has no rotatable bonds; models are empty.");
    }

    let stem = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("molecule");

    let mut written = Vec::new();
    for model in result.unique_models() {
        let path = args.output_dir.join(model_file_name(stem, model));
        model
            .to_file()
            .write_to_path(&path)
            .map_err(|e| CliError::writing(&path, e))?;
        info!(
            "Wrote model {} ({} variables, {} QUBO terms) to {:?}",
            model.key(),
            model.stats.variable_count,
            model.stats.qubo_terms,
            &path
        );
        written.push(path);
    }
    Ok(written)
}

/// `{stem}_M{m}_D{d}_A{a}_HQ{hq}.json`, using the model's effective complexity.
fn model_file_name(stem: &str, model: &EnergyModel) -> String {
    let params = model.key().params();
    format!(
        "{}_M{}_D{}_A{}_HQ{}.json",
        stem, params.m, params.d, params.a, params.hq
    )
}
