use crate::core::energy::polynomial::{Polynomial, Term};
use crate::core::graph::RotatableBond;
use crate::core::models::conformation::Conformation;
use crate::core::torsion::group::RotationGroup;
use crate::core::torsion::variables::{Variable, VariableMapping};
use crate::engine::context::BuildContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::rotation::apply_rotation_group;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Builds the separation reward for every rotation group of level `m`.
///
/// Every combination of one step per member bond becomes a term whose
/// coefficient is the negated centroid distance achieved by that combination,
/// so a group with `k` members contributes `D^k` terms. Groups are evaluated
/// in parallel and merged additively.
#[instrument(skip_all, name = "distance_terms_task")]
pub fn run(
    context: &BuildContext,
    m: usize,
    mapping: &VariableMapping,
) -> Result<Polynomial, EngineError> {
    let groups = context.catalogue.groups(m);
    info!(level = m, groups = groups.len(), "Computing distance terms.");
    if groups.is_empty() {
        return Ok(Polynomial::new());
    }

    context.reporter.report(Progress::TaskStart {
        total_steps: groups.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = groups.iter();

    #[cfg(feature = "parallel")]
    let iterator = groups.par_iter();

    let per_group: Vec<Vec<(Term, f64)>> = iterator
        .map(|group| {
            let terms = group_terms(context.catalogue.bonds(), group, mapping, &context.base);
            context.reporter.report(Progress::TaskIncrement);
            terms
        })
        .collect::<Result<_, _>>()?;

    context.reporter.report(Progress::TaskFinish);

    let polynomial: Polynomial = per_group.into_iter().flatten().collect();
    debug!(terms = polynomial.len(), "Distance terms complete.");
    Ok(polynomial)
}

/// Enumerates all `D^k` step combinations of one group.
pub(crate) fn group_terms(
    bonds: &[RotatableBond],
    group: &RotationGroup,
    mapping: &VariableMapping,
    base: &Conformation,
) -> Result<Vec<(Term, f64)>, EngineError> {
    let families: Vec<usize> = group.members.iter().map(|m| m.bond_index + 1).collect();
    let steps_per_bond = mapping.steps();
    let mut steps = vec![1usize; families.len()];
    let mut terms = Vec::new();

    loop {
        let angles: Vec<f64> = steps.iter().map(|&s| mapping.angle_degrees(s)).collect();
        let (_, distance) = apply_rotation_group(bonds, group, &angles, base)?;

        let variables = families
            .iter()
            .zip(&steps)
            .map(|(&family, &step)| {
                mapping.variable(family, step).ok_or_else(|| {
                    EngineError::Internal(format!(
                        "group '{}' references family {} outside the variable mapping",
                        group.name, family
                    ))
                })
            })
            .collect::<Result<Vec<Variable>, _>>()?;
        terms.push((Term::new(variables), -distance));

        if !advance_odometer(&mut steps, steps_per_bond) {
            break;
        }
    }
    Ok(terms)
}

/// Advances a little-endian-last odometer over `1..=max`; returns `false` after the last state.
fn advance_odometer(steps: &mut [usize], max: usize) -> bool {
    for step in steps.iter_mut().rev() {
        if *step < max {
            *step += 1;
            return true;
        }
        *step = 1;
    }
    false
}
