use super::builder::EnergyModel;
use super::config::ReconstructionConfig;
use super::error::EngineError;
use super::rotation::{apply_torsions, side_distance};
use super::state::{Anomaly, ChosenTorsion, Fallback, Reconstruction};
use super::tasks::clash_detection;
use crate::core::energy::sample::{Sample, rank_samples};
use crate::core::models::conformation::Conformation;
use crate::core::models::molecule::Molecule;
use tracing::{debug, info, instrument, warn};

/// Turns solver samples for one energy model back into a conformation.
pub struct ConformationReconstructor<'a> {
    model: &'a EnergyModel,
    molecule: &'a Molecule,
    config: ReconstructionConfig,
}

impl<'a> ConformationReconstructor<'a> {
    /// Pairs a model with the molecule it was built from.
    ///
    /// Fails with [`EngineError::ModelMismatch`] when the model's bonds or
    /// groups refer to atoms the molecule does not have.
    pub fn new(
        model: &'a EnergyModel,
        molecule: &'a Molecule,
        config: ReconstructionConfig,
    ) -> Result<Self, EngineError> {
        check_model_matches(model, molecule)?;
        if model.molecule != molecule.name() {
            warn!(
                model = %model.molecule,
                molecule = molecule.name(),
                "Model was built for a molecule with a different name."
            );
        }
        Ok(Self {
            model,
            molecule,
            config,
        })
    }

    /// Picks the best usable sample and applies its torsions.
    ///
    /// Samples are inspected in ascending energy order, at most
    /// `max_candidates` of them. With clash checking enabled, a sample whose
    /// conformation clashes is skipped. The first remaining sample decides the
    /// outcome: if it does not unfold the molecule (gain below 1) the initial
    /// conformation is returned instead.
    #[instrument(skip_all, name = "conformation_reconstructor")]
    pub fn reconstruct(&self, samples: &[Sample]) -> Result<Reconstruction, EngineError> {
        let initial = self.molecule.conformation();
        if samples.is_empty() {
            warn!("No samples to interpret; keeping the initial conformation.");
            return Ok(Reconstruction::unchanged(initial, Fallback::NoSamples, 0));
        }

        let mut ranked = samples.to_vec();
        rank_samples(&mut ranked);
        let initial_separation = self.total_separation(&initial)?;

        let mut inspected = 0;
        for (rank, sample) in ranked.iter().take(self.config.max_candidates).enumerate() {
            inspected = rank + 1;
            let (torsions, anomalies) = self.decode(sample);
            let angles: Vec<f64> = torsions.iter().map(|t| t.angle_degrees).collect();
            let candidate = apply_torsions(&self.model.bonds, &angles, &initial)?;

            if self.config.check_clashes {
                let clashes = clash_detection::run(
                    self.molecule,
                    &initial,
                    &candidate,
                    self.config.clash_scale,
                )?;
                if let Some(first) = clashes.first() {
                    debug!(
                        rank,
                        energy = sample.energy,
                        clashes = clashes.len(),
                        atom_a = first.atom_a,
                        atom_b = first.atom_b,
                        "Sample rejected: steric clash."
                    );
                    continue;
                }
            }

            if !anomalies.is_empty() {
                warn!(
                    rank,
                    count = anomalies.len(),
                    "Accepted sample does not encode exactly one step per bond."
                );
            }

            let separation = self.total_separation(&candidate)?;
            let gain = if initial_separation == 0.0 {
                1.0
            } else {
                separation / initial_separation
            };

            if gain < 1.0 {
                info!(rank, gain, "Best feasible sample does not unfold the molecule.");
                let mut result = Reconstruction::unchanged(initial, Fallback::NoImprovement, inspected);
                result.sample_rank = Some(rank);
                result.anomalies = anomalies;
                return Ok(result);
            }

            info!(rank, energy = sample.energy, gain, "Sample accepted.");
            return Ok(Reconstruction {
                conformation: candidate,
                gain,
                feasible: true,
                torsions,
                sample_rank: Some(rank),
                anomalies,
                fallback: None,
                inspected,
            });
        }

        warn!(inspected, "No inspected sample is free of clashes.");
        Ok(Reconstruction::unchanged(initial, Fallback::Infeasible, inspected))
    }

    /// Reads the active step of every bond family from a sample.
    pub fn decode(&self, sample: &Sample) -> (Vec<ChosenTorsion>, Vec<Anomaly>) {
        let mapping = &self.model.mapping;
        let mut torsions = Vec::with_capacity(mapping.family_count());
        let mut anomalies = Vec::new();

        for family in 1..=mapping.family_count() {
            let bond = mapping.bond_name(family).unwrap_or_default().to_string();
            let active: Vec<usize> = (1..=mapping.steps())
                .filter(|&step| {
                    mapping
                        .variable(family, step)
                        .is_some_and(|v| sample.is_active(&v))
                })
                .collect();

            let step = match active.as_slice() {
                [] => {
                    anomalies.push(Anomaly::MissingVariable {
                        family,
                        bond: bond.clone(),
                    });
                    1
                }
                [step] => *step,
                [lowest, ..] => {
                    anomalies.push(Anomaly::MultipleActive {
                        family,
                        bond: bond.clone(),
                        steps: active.clone(),
                    });
                    *lowest
                }
            };

            torsions.push(ChosenTorsion {
                family,
                bond,
                step,
                angle_degrees: mapping.angle_degrees(step),
            });
        }
        (torsions, anomalies)
    }

    /// Sum of side-to-side centroid distances over the model's groups.
    fn total_separation(&self, conformation: &Conformation) -> Result<f64, EngineError> {
        self.model
            .groups
            .iter()
            .try_fold(0.0, |sum, group| -> Result<f64, EngineError> {
                Ok(sum + side_distance(group, conformation)?)
            })
    }
}

fn check_model_matches(model: &EnergyModel, molecule: &Molecule) -> Result<(), EngineError> {
    let n = molecule.len();
    for bond in &model.bonds {
        let endpoints_match = molecule.index_of(bond.atom1) == Some(bond.index1)
            && molecule.index_of(bond.atom2) == Some(bond.index2);
        let fragments_fit = bond
            .fragment_0
            .iter()
            .chain(&bond.fragment_1)
            .all(|&idx| idx < n);
        if !endpoints_match || !fragments_fit {
            return Err(EngineError::ModelMismatch(format!(
                "bond {} does not fit molecule '{}'",
                bond.name,
                molecule.name()
            )));
        }
    }
    for group in &model.groups {
        let in_bounds = group.side_0.iter().chain(&group.side_1).all(|&idx| idx < n);
        let members_known = group.members.iter().all(|m| m.bond_index < model.bonds.len());
        if !in_bounds || !members_known {
            return Err(EngineError::ModelMismatch(format!(
                "group {} does not fit molecule '{}'",
                group.name,
                molecule.name()
            )));
        }
    }
    if model.mapping.family_count() != model.bonds.len() {
        return Err(EngineError::ModelMismatch(format!(
            "{} variable families for {} bonds",
            model.mapping.family_count(),
            model.bonds.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::tests::molecule_from_bonds;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{Bond, BondOrder};
    use crate::core::torsion::variables::Variable;
    use crate::engine::builder::EnergyModelBuilder;
    use crate::engine::config::{ModelParams, ReconstructionConfigBuilder};
    use crate::engine::context::BuildContext;
    use crate::engine::progress::ProgressReporter;
    use crate::engine::rotation::tests::folded_butane;
    use nalgebra::Point3;

    fn x(step: usize) -> Variable {
        Variable::Torsion { family: 1, step }
    }

    fn butane_model(molecule: &Molecule) -> EnergyModel {
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(molecule, 1, &reporter);
        EnergyModelBuilder::new(&context)
            .build(ModelParams::new(1, 4, 300.0, 200.0))
            .unwrap()
    }

    fn no_clash_check() -> ReconstructionConfig {
        ReconstructionConfigBuilder::new()
            .check_clashes(false)
            .build()
            .unwrap()
    }

    #[test]
    fn half_turn_sample_unfolds_butane() {
        let molecule = folded_butane();
        let model = butane_model(&molecule);
        let reconstructor = ConformationReconstructor::new(&model, &molecule, no_clash_check()).unwrap();

        let result = reconstructor
            .reconstruct(&[Sample::new(-301.8, [x(3)])])
            .unwrap();

        assert!(result.fallback.is_none());
        assert!(result.feasible);
        assert_eq!(result.sample_rank, Some(0));
        assert_eq!(result.torsions[0].step, 3);
        assert_eq!(result.torsions[0].angle_degrees, 180.0);
        assert!((result.gain - 3.25f64.sqrt() / 1.5).abs() < 1e-9);
        assert!((result.conformation[3] - Point3::new(1.5, -1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn refolding_sample_falls_back_to_the_initial_conformation() {
        // Butane already in its extended form: a half turn folds it.
        let atoms = vec![
            Atom::new(1, "C1", "C", Point3::new(0.0, 1.0, 0.0)),
            Atom::new(2, "C2", "C", Point3::new(0.0, 0.0, 0.0)),
            Atom::new(3, "C3", "C", Point3::new(1.5, 0.0, 0.0)),
            Atom::new(4, "C4", "C", Point3::new(1.5, -1.0, 0.0)),
        ];
        let bonds = vec![
            Bond::new(1, 2, BondOrder::Single),
            Bond::new(2, 3, BondOrder::Single),
            Bond::new(3, 4, BondOrder::Single),
        ];
        let molecule = Molecule::new("butane", atoms, bonds).unwrap();
        let model = butane_model(&molecule);
        let reconstructor = ConformationReconstructor::new(&model, &molecule, no_clash_check()).unwrap();

        let result = reconstructor.reconstruct(&[Sample::new(-300.0, [x(3)])]).unwrap();

        assert_eq!(result.fallback, Some(Fallback::NoImprovement));
        assert_eq!(result.gain, 1.0);
        assert_eq!(result.conformation, molecule.conformation());
    }

    #[test]
    fn empty_sample_list_falls_back() {
        let molecule = folded_butane();
        let model = butane_model(&molecule);
        let reconstructor =
            ConformationReconstructor::new(&model, &molecule, ReconstructionConfig::default()).unwrap();

        let result = reconstructor.reconstruct(&[]).unwrap();
        assert_eq!(result.fallback, Some(Fallback::NoSamples));
        assert_eq!(result.inspected, 0);
        assert_eq!(result.conformation, molecule.conformation());
    }

    #[test]
    fn clashing_samples_are_skipped_in_energy_order() {
        let molecule = folded_butane();
        let model = butane_model(&molecule);
        let config = ReconstructionConfigBuilder::new()
            .clash_scale(0.7)
            .build()
            .unwrap();
        let reconstructor = ConformationReconstructor::new(&model, &molecule, config).unwrap();

        // The quarter turn brings C1 and C4 within 0.7 * 3.4 Å; the half turn does not.
        let samples = [Sample::new(-5.0, [x(3)]), Sample::new(-10.0, [x(2)])];
        let result = reconstructor.reconstruct(&samples).unwrap();

        assert_eq!(result.sample_rank, Some(1));
        assert_eq!(result.inspected, 2);
        assert_eq!(result.torsions[0].step, 3);
        assert!(result.gain > 1.0);
    }

    #[test]
    fn only_clashing_samples_are_infeasible() {
        let molecule = folded_butane();
        let model = butane_model(&molecule);
        let reconstructor =
            ConformationReconstructor::new(&model, &molecule, ReconstructionConfig::default()).unwrap();

        let result = reconstructor.reconstruct(&[Sample::new(-1.0, [x(3)])]).unwrap();

        assert_eq!(result.fallback, Some(Fallback::Infeasible));
        assert!(!result.feasible);
        assert_eq!(result.gain, 1.0);
        assert_eq!(result.conformation, molecule.conformation());
    }

    #[test]
    fn max_candidates_limits_inspection() {
        let molecule = folded_butane();
        let model = butane_model(&molecule);
        let config = ReconstructionConfigBuilder::new().max_candidates(1).build().unwrap();
        let reconstructor = ConformationReconstructor::new(&model, &molecule, config).unwrap();

        // The identity sample would be accepted but ranks second.
        let samples = [Sample::new(-1.0, [x(3)]), Sample::new(0.0, [x(1)])];
        let result = reconstructor.reconstruct(&samples).unwrap();
        assert_eq!(result.fallback, Some(Fallback::Infeasible));
        assert_eq!(result.inspected, 1);
    }

    #[test]
    fn decoding_reports_missing_and_multiple_steps() {
        let molecule = folded_butane();
        let model = butane_model(&molecule);
        let reconstructor = ConformationReconstructor::new(&model, &molecule, no_clash_check()).unwrap();

        let (torsions, anomalies) = reconstructor.decode(&Sample::new(0.0, [Variable::Auxiliary(1)]));
        assert_eq!(torsions[0].step, 1);
        assert_eq!(
            anomalies,
            vec![Anomaly::MissingVariable {
                family: 1,
                bond: "2_3".into()
            }]
        );

        let (torsions, anomalies) = reconstructor.decode(&Sample::new(0.0, [x(3), x(2)]));
        assert_eq!(torsions[0].step, 2);
        assert_eq!(torsions[0].angle_degrees, 90.0);
        assert!(matches!(
            &anomalies[..],
            [Anomaly::MultipleActive { steps, .. }] if steps == &vec![2, 3]
        ));
    }

    #[test]
    fn model_for_another_molecule_is_rejected() {
        let molecule = folded_butane();
        let model = butane_model(&molecule);
        let other = molecule_from_bonds(2, &[(1, 2)]);
        assert!(matches!(
            ConformationReconstructor::new(&model, &other, ReconstructionConfig::default()),
            Err(EngineError::ModelMismatch(_))
        ));
    }
}
