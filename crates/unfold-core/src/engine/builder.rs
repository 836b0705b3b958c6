use super::config::{ModelKey, ModelParams};
use super::context::BuildContext;
use super::error::EngineError;
use super::progress::Progress;
use super::tasks::{constraints, distances};
use crate::core::energy::polynomial::Polynomial;
use crate::core::energy::quadratize::{AuxiliaryDefinition, quadratize};
use crate::core::energy::sample::Sample;
use crate::core::graph::RotatableBond;
use crate::core::io::model_file::{
    FamilyRecord, MODEL_FORMAT_VERSION, ModelFile, ParamsRecord, polynomial_to_records,
    records_to_polynomial,
};
use crate::core::torsion::group::RotationGroup;
use crate::core::torsion::variables::VariableMapping;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Size and timing figures of a built model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BuildStats {
    pub variable_count: usize,
    pub hubo_terms: usize,
    pub qubo_terms: usize,
    pub auxiliary_count: usize,
    pub max_degree: usize,
    pub elapsed: Duration,
}

/// A fully built energy model for one parameter tuple.
///
/// Read-only once built. `params.m` is the requested complexity; the model
/// itself only covers the `effective_m` top-ranked bonds.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyModel {
    pub molecule: String,
    pub params: ModelParams,
    pub effective_m: usize,
    pub mapping: VariableMapping,
    pub bonds: Vec<RotatableBond>,
    pub groups: Vec<RotationGroup>,
    pub constraints: Polynomial,
    pub distances: Polynomial,
    pub hubo: Polynomial,
    pub qubo: Polynomial,
    pub auxiliaries: Vec<AuxiliaryDefinition>,
    pub stats: BuildStats,
}

impl EnergyModel {
    /// The cache identity of this model, using the effective complexity.
    pub fn key(&self) -> ModelKey {
        self.params.with_m(self.effective_m).key()
    }

    /// True when the molecule has nothing to rotate.
    pub fn is_degenerate(&self) -> bool {
        self.effective_m == 0
    }

    /// QUBO energy of a sample's assignment.
    pub fn energy(&self, sample: &Sample) -> f64 {
        self.qubo.energy(&sample.active)
    }

    pub fn to_file(&self) -> ModelFile {
        let families = (1..=self.mapping.family_count())
            .map(|family| FamilyRecord {
                family,
                bond: self.mapping.bond_name(family).unwrap_or_default().to_string(),
                variables: self.mapping.variables_of(family),
            })
            .collect();

        ModelFile {
            format_version: MODEL_FORMAT_VERSION,
            molecule: self.molecule.clone(),
            params: ParamsRecord {
                m: self.params.m,
                d: self.params.d,
                a: self.params.a,
                hq: self.params.hq,
            },
            effective_m: self.effective_m,
            families,
            bonds: self.bonds.clone(),
            groups: self.groups.clone(),
            auxiliaries: self.auxiliaries.clone(),
            constraints: polynomial_to_records(&self.constraints),
            distances: polynomial_to_records(&self.distances),
            qubo: polynomial_to_records(&self.qubo),
        }
    }

    /// Restores a model from its persisted form.
    ///
    /// The variable tables are rebuilt from the family records and checked
    /// against the stored bonds. Build timing is not persisted.
    pub fn from_file(file: ModelFile) -> Result<Self, EngineError> {
        let params = ModelParams::new(file.params.m, file.params.d, file.params.a, file.params.hq);
        params.validate()?;

        let mut families = file.families;
        families.sort_by_key(|f| f.family);
        for (idx, family) in families.iter().enumerate() {
            if family.family != idx + 1 {
                return Err(EngineError::ModelMismatch(format!(
                    "family indices are not contiguous at family {}",
                    family.family
                )));
            }
        }
        if families.len() != file.effective_m || file.bonds.len() != file.effective_m {
            return Err(EngineError::ModelMismatch(format!(
                "effective M is {} but the file lists {} families and {} bonds",
                file.effective_m,
                families.len(),
                file.bonds.len()
            )));
        }
        if let Some((family, bond)) = families
            .iter()
            .zip(&file.bonds)
            .find(|(family, bond)| family.bond != bond.name)
        {
            return Err(EngineError::ModelMismatch(format!(
                "family {} names bond '{}' but the bond table has '{}'",
                family.family, family.bond, bond.name
            )));
        }

        let mapping = VariableMapping::from_names(
            families.iter().map(|f| f.bond.clone()).collect(),
            params.d,
        )?;
        for family in &families {
            if family.variables != mapping.variables_of(family.family) {
                return Err(EngineError::ModelMismatch(format!(
                    "variables of family {} do not match D={}",
                    family.family, params.d
                )));
            }
        }

        let constraints = records_to_polynomial(&file.constraints);
        let distances = records_to_polynomial(&file.distances);
        let mut hubo = constraints.clone();
        hubo += &distances;
        let qubo = records_to_polynomial(&file.qubo);

        let stats = BuildStats {
            variable_count: mapping.variable_count(),
            hubo_terms: hubo.len(),
            qubo_terms: qubo.len(),
            auxiliary_count: file.auxiliaries.len(),
            max_degree: hubo.max_degree(),
            elapsed: Duration::ZERO,
        };

        Ok(Self {
            molecule: file.molecule,
            params,
            effective_m: file.effective_m,
            mapping,
            bonds: file.bonds,
            groups: file.groups,
            constraints,
            distances,
            hubo,
            qubo,
            auxiliaries: file.auxiliaries,
            stats,
        })
    }
}

/// Builds energy models from a shared [`BuildContext`].
pub struct EnergyModelBuilder<'c, 'a> {
    context: &'c BuildContext<'a>,
}

impl<'c, 'a> EnergyModelBuilder<'c, 'a> {
    pub fn new(context: &'c BuildContext<'a>) -> Self {
        Self { context }
    }

    /// Builds the model for one parameter tuple.
    ///
    /// `params.m` is clamped to the number of rotatable bonds. A molecule
    /// without rotatable bonds yields an empty, degenerate model.
    #[instrument(skip_all, name = "energy_model_builder", fields(params = %params))]
    pub fn build(&self, params: ModelParams) -> Result<EnergyModel, EngineError> {
        params.validate()?;
        let start = Instant::now();
        let context = self.context;
        let reporter = context.reporter;

        let effective_m = context.effective_m(params.m);
        if effective_m == 0 {
            warn!("Molecule has no rotatable bonds; building an empty model.");
        } else if effective_m < params.m {
            warn!(
                requested = params.m,
                effective = effective_m,
                "Requested complexity exceeds the rotatable bonds; clamping."
            );
        }
        if effective_m > context.catalogue.max_level() {
            return Err(EngineError::Internal(format!(
                "catalogue only covers levels up to {}, model needs {}",
                context.catalogue.max_level(),
                effective_m
            )));
        }

        let bonds = context.catalogue.bonds()[..effective_m].to_vec();
        let groups = context.catalogue.groups(effective_m).to_vec();
        let mapping = VariableMapping::new(&bonds, params.d)?;

        let constraints = reporter.phase("One-hot Constraints", || {
            constraints::one_hot_constraints(&mapping, params.a)
        });

        let distances = reporter.phase("Distance Terms", || {
            distances::run(context, effective_m, &mapping)
        })?;

        let mut hubo = constraints.clone();
        hubo += &distances;

        let quadratized = reporter.phase("Quadratization", || quadratize(&hubo, params.hq));

        let stats = BuildStats {
            variable_count: mapping.variable_count(),
            hubo_terms: hubo.len(),
            qubo_terms: quadratized.qubo.len(),
            auxiliary_count: quadratized.auxiliaries.len(),
            max_degree: hubo.max_degree(),
            elapsed: start.elapsed(),
        };
        reporter.report(Progress::Message(format!(
            "Built model {} with {} variables and {} QUBO terms",
            params.with_m(effective_m),
            stats.variable_count,
            stats.qubo_terms
        )));
        info!(
            effective_m,
            variables = stats.variable_count,
            hubo_terms = stats.hubo_terms,
            qubo_terms = stats.qubo_terms,
            auxiliaries = stats.auxiliary_count,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Energy model built."
        );

        Ok(EnergyModel {
            molecule: context.molecule.name().to_string(),
            params,
            effective_m,
            mapping,
            bonds,
            groups,
            constraints,
            distances,
            hubo,
            qubo: quadratized.qubo,
            auxiliaries: quadratized.auxiliaries,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::energy::polynomial::Term;
    use crate::core::graph::tests::molecule_from_bonds;
    use crate::core::torsion::variables::Variable;
    use crate::engine::progress::ProgressReporter;
    use crate::engine::rotation::tests::folded_butane;

    #[test]
    fn single_bond_model_has_d_variables_and_one_hot_terms() {
        let molecule = folded_butane();
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 1, &reporter);

        let model = EnergyModelBuilder::new(&context)
            .build(ModelParams::new(1, 8, 300.0, 200.0))
            .unwrap();

        assert_eq!(model.effective_m, 1);
        assert_eq!(model.stats.variable_count, 8);
        let linear = model.constraints.iter().filter(|(t, _)| t.degree() == 1);
        let quadratic = model.constraints.iter().filter(|(t, _)| t.degree() == 2);
        assert!(linear.clone().all(|(_, &c)| c == -300.0));
        assert!(quadratic.clone().all(|(_, &c)| c == 300.0));
        assert_eq!(linear.count(), 8);
        assert_eq!(quadratic.count(), 56);
        // A single bond only produces linear distance terms: nothing to quadratize.
        assert_eq!(model.distances.len(), 8);
        assert!(model.auxiliaries.is_empty());
        assert_eq!(model.qubo, model.hubo);
    }

    #[test]
    fn hubo_merges_constraints_and_distances_additively() {
        let molecule = folded_butane();
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 1, &reporter);

        let model = EnergyModelBuilder::new(&context)
            .build(ModelParams::new(1, 2, 10.0, 20.0))
            .unwrap();

        let x11 = Term::single(Variable::Torsion { family: 1, step: 1 });
        let expected = -10.0 + model.distances.coefficient(&x11).unwrap();
        assert_eq!(model.hubo.coefficient(&x11), Some(expected));
    }

    #[test]
    fn multi_bond_model_is_quadratized() {
        let molecule = molecule_from_bonds(6, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]);
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 3, &reporter);

        let model = EnergyModelBuilder::new(&context)
            .build(ModelParams::new(3, 2, 100.0, 200.0))
            .unwrap();

        assert_eq!(model.stats.max_degree, 3);
        assert!(!model.auxiliaries.is_empty());
        assert!(model.qubo.max_degree() <= 2);
        assert_eq!(model.stats.auxiliary_count, model.auxiliaries.len());
        assert_eq!(model.groups.len(), context.catalogue.groups(3).len());
    }

    #[test]
    fn requested_m_is_clamped_and_keyed_by_effective_m() {
        let molecule = folded_butane();
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 4, &reporter);

        let model = EnergyModelBuilder::new(&context)
            .build(ModelParams::new(4, 4, 300.0, 200.0))
            .unwrap();

        assert_eq!(model.params.m, 4);
        assert_eq!(model.effective_m, 1);
        assert_eq!(model.key(), ModelParams::new(1, 4, 300.0, 200.0).key());
    }

    #[test]
    fn molecule_without_rotatable_bonds_gives_degenerate_model() {
        let molecule = molecule_from_bonds(2, &[(1, 2)]);
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 2, &reporter);

        let model = EnergyModelBuilder::new(&context)
            .build(ModelParams::new(2, 4, 300.0, 200.0))
            .unwrap();

        assert!(model.is_degenerate());
        assert!(model.qubo.is_empty());
        assert_eq!(model.stats.variable_count, 0);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let molecule = folded_butane();
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 1, &reporter);
        let result = EnergyModelBuilder::new(&context).build(ModelParams::new(1, 0, 300.0, 200.0));
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn model_survives_a_file_round_trip() {
        let molecule = molecule_from_bonds(6, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]);
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 2, &reporter);
        let model = EnergyModelBuilder::new(&context)
            .build(ModelParams::new(2, 3, 300.0, 200.0))
            .unwrap();

        let json = model.to_file().to_json().unwrap();
        let restored = EnergyModel::from_file(ModelFile::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored.stats.elapsed, Duration::ZERO);
        assert_eq!(
            restored,
            EnergyModel {
                stats: BuildStats {
                    elapsed: Duration::ZERO,
                    ..model.stats
                },
                ..model
            }
        );
    }

    #[test]
    fn tampered_family_table_is_a_mismatch() {
        let molecule = folded_butane();
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 1, &reporter);
        let model = EnergyModelBuilder::new(&context)
            .build(ModelParams::new(1, 2, 300.0, 200.0))
            .unwrap();

        let mut file = model.to_file();
        file.families[0].bond = "1_2".into();
        assert!(matches!(
            EnergyModel::from_file(file),
            Err(EngineError::ModelMismatch(_))
        ));
    }
}
