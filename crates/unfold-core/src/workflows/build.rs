use crate::core::models::molecule::Molecule;
use crate::engine::builder::{EnergyModel, EnergyModelBuilder};
use crate::engine::cache::{CacheStatus, ModelCache};
use crate::engine::config::{BuildConfig, ModelParams};
use crate::engine::context::BuildContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::sync::Arc;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One entry of the parameter grid and the model that serves it.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub requested: ModelParams,
    pub model: Arc<EnergyModel>,
    pub status: CacheStatus,
}

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub rotatable_bonds: usize,
    pub models: Vec<BuiltModel>,
}

impl BuildResult {
    /// Distinct models, one per effective parameter tuple.
    pub fn unique_models(&self) -> impl Iterator<Item = &Arc<EnergyModel>> {
        self.models
            .iter()
            .filter(|m| m.status == CacheStatus::Built)
            .map(|m| &m.model)
    }
}

/// Builds one energy model per parameter combination of `config`.
///
/// The molecule is analysed once for the largest requested complexity.
/// Combinations are built in parallel through `cache`; combinations that
/// clamp to the same effective parameters share a single model. Models the
/// cache holds for other molecules are never reused.
#[instrument(skip_all, name = "build_workflow")]
pub fn run(
    molecule: &Molecule,
    config: &BuildConfig,
    cache: &ModelCache,
    reporter: &ProgressReporter,
) -> Result<BuildResult, EngineError> {
    let grid = config.param_grid();
    info!(
        molecule = molecule.name(),
        atoms = molecule.len(),
        combinations = grid.len(),
        "Starting model construction."
    );

    // With several models in flight their inner phases would interleave, so only
    // a single-model build forwards them.
    let silent = ProgressReporter::new();
    let inner_reporter = if grid.len() == 1 { reporter } else { &silent };

    let context = reporter.phase("Molecule Analysis", || {
        BuildContext::new(molecule, config.max_m(), inner_reporter)
    });
    let rotatable_bonds = context.graph.rotatable_bonds().len();
    info!(rotatable_bonds, "Molecule analysed.");

    let builder = EnergyModelBuilder::new(&context);
    let fingerprint = molecule.fingerprint();

    reporter.report(Progress::PhaseStart {
        name: "Model Construction",
    });
    if grid.len() > 1 {
        reporter.report(Progress::TaskStart {
            total_steps: grid.len() as u64,
        });
    }

    #[cfg(not(feature = "parallel"))]
    let iterator = grid.iter();

    #[cfg(feature = "parallel")]
    let iterator = grid.par_iter();

    let models: Result<Vec<BuiltModel>, EngineError> = iterator
        .map(|&requested| {
            requested.validate()?;
            let key = requested.with_m(context.effective_m(requested.m)).key();
            let (model, status) =
                cache.get_or_build(fingerprint, key, || builder.build(requested))?;
            if grid.len() > 1 {
                reporter.report(Progress::TaskIncrement);
            }
            Ok(BuiltModel {
                requested,
                model,
                status,
            })
        })
        .collect();

    if grid.len() > 1 {
        reporter.report(Progress::TaskFinish);
    }
    reporter.report(Progress::PhaseFinish);
    let models = models?;

    info!(
        requested = models.len(),
        built = models.iter().filter(|m| m.status == CacheStatus::Built).count(),
        "Model construction complete."
    );
    Ok(BuildResult {
        rotatable_bonds,
        models,
    })
}
