use crate::core::energy::sample::Sample;
use crate::core::models::molecule::Molecule;
use crate::engine::builder::EnergyModel;
use crate::engine::config::ReconstructionConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::reconstruct::ConformationReconstructor;
use crate::engine::state::Reconstruction;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ReconstructionResult {
    pub reconstruction: Reconstruction,
    /// The input molecule with the reconstructed positions.
    pub molecule: Molecule,
    /// The model's own QUBO energy of the accepted sample, when there is one.
    pub model_energy: Option<f64>,
}

/// Interprets solver samples for `model` and produces the unfolded molecule.
#[instrument(skip_all, name = "reconstruct_workflow")]
pub fn run(
    molecule: &Molecule,
    model: &EnergyModel,
    samples: &[Sample],
    config: &ReconstructionConfig,
    reporter: &ProgressReporter,
) -> Result<ReconstructionResult, EngineError> {
    info!(
        molecule = molecule.name(),
        model = %model.key(),
        samples = samples.len(),
        "Starting reconstruction."
    );

    let reconstructor = reporter.phase("Checking Model", || {
        ConformationReconstructor::new(model, molecule, config.clone())
    })?;

    let reconstruction = reporter.phase("Reconstruction", || reconstructor.reconstruct(samples))?;

    let mut ranked = samples.to_vec();
    crate::core::energy::sample::rank_samples(&mut ranked);
    let model_energy = reconstruction
        .sample_rank
        .and_then(|rank| ranked.get(rank))
        .map(|sample| {
            let energy = model.energy(sample);
            if (energy - sample.energy).abs() > 1e-6 * energy.abs().max(1.0) {
                warn!(
                    reported = sample.energy,
                    recomputed = energy,
                    "Sample energy differs from the model's QUBO energy."
                );
            }
            energy
        });

    match reconstruction.fallback {
        Some(fallback) => info!(%fallback, "Keeping the initial conformation."),
        None => info!(gain = reconstruction.gain, "Reconstruction complete."),
    }

    Ok(ReconstructionResult {
        molecule: molecule.with_conformation(&reconstruction.conformation),
        reconstruction,
        model_energy,
    })
}
