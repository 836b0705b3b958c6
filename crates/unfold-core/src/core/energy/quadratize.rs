use super::polynomial::{Polynomial, Term};
use crate::core::torsion::variables::Variable;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// An auxiliary variable standing for the product of two other variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryDefinition {
    pub variable: Variable,
    pub factors: (Variable, Variable),
}

/// The result of reducing a higher-order polynomial to degree two.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quadratization {
    pub qubo: Polynomial,
    pub auxiliaries: Vec<AuxiliaryDefinition>,
}

/// Reduces a HUBO to a QUBO by repeated pair substitution.
///
/// While any term has more than two distinct variables, the variable pair that
/// occurs most often among such terms (ties broken by the smallest pair) is
/// replaced by a fresh auxiliary `a = u·v`, and the penalty
/// `penalty · (u·v − 2·u·a − 2·v·a + 3·a)` is added. The penalty vanishes iff
/// `a = u·v` and is at least `penalty` otherwise, so a large enough `penalty`
/// preserves the minimisers of the original polynomial.
///
/// Terms of degree one or two pass through unchanged.
pub fn quadratize(hubo: &Polynomial, penalty: f64) -> Quadratization {
    let mut low = Polynomial::new();
    let mut high: Vec<(Vec<Variable>, f64)> = Vec::new();

    for (term, &coefficient) in hubo.iter() {
        if term.distinct_degree() > 2 {
            high.push((term.variables().iter().copied().unique().collect(), coefficient));
        } else {
            low.add_term(term.clone(), coefficient);
        }
    }

    let mut auxiliaries = Vec::new();
    while !high.is_empty() {
        let Some((u, v)) = most_frequent_pair(&high) else {
            break;
        };
        let aux = Variable::Auxiliary(auxiliaries.len() + 1);
        auxiliaries.push(AuxiliaryDefinition {
            variable: aux,
            factors: (u, v),
        });

        let mut remaining = Vec::with_capacity(high.len());
        for (mut variables, coefficient) in high {
            if variables.contains(&u) && variables.contains(&v) {
                substitute(&mut variables, u, v, aux);
            }
            if variables.len() > 2 {
                remaining.push((variables, coefficient));
            } else {
                low.add_term(Term::new(variables), coefficient);
            }
        }
        high = remaining;

        low.add_term(Term::pair(u, v), penalty);
        low.add_term(Term::pair(u, aux), -2.0 * penalty);
        low.add_term(Term::pair(v, aux), -2.0 * penalty);
        low.add_term(Term::single(aux), 3.0 * penalty);
    }

    debug!(
        auxiliaries = auxiliaries.len(),
        terms = low.len(),
        "Quadratized polynomial."
    );

    Quadratization {
        qubo: low,
        auxiliaries,
    }
}

/// Counts unordered variable pairs across terms; returns the most frequent, smallest on ties.
fn most_frequent_pair(terms: &[(Vec<Variable>, f64)]) -> Option<(Variable, Variable)> {
    let mut counts: BTreeMap<(Variable, Variable), usize> = BTreeMap::new();
    for (variables, _) in terms {
        for (a, b) in variables.iter().sorted().tuple_combinations() {
            *counts.entry((*a, *b)).or_insert(0) += 1;
        }
    }

    let mut best: Option<((Variable, Variable), usize)> = None;
    for (pair, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((pair, count));
        }
    }
    best.map(|(pair, _)| pair)
}

/// Replaces `u` and `v` with `aux`, keeping `aux` at the position of whichever came first.
fn substitute(variables: &mut Vec<Variable>, u: Variable, v: Variable, aux: Variable) {
    let mut placed = false;
    variables.retain_mut(|var| {
        if *var == u || *var == v {
            if placed {
                return false;
            }
            *var = aux;
            placed = true;
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn x(family: usize) -> Variable {
        Variable::Torsion { family, step: 1 }
    }

    /// Enumerates every assignment of `variables` and returns (minimum energy, minimisers).
    fn brute_force(p: &Polynomial, variables: &[Variable]) -> (f64, Vec<BTreeSet<Variable>>) {
        let mut best = f64::INFINITY;
        let mut minimisers = Vec::new();
        for mask in 0u32..(1 << variables.len()) {
            let active: BTreeSet<Variable> = variables
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, v)| *v)
                .collect();
            let energy = p.energy(&active);
            if energy < best - 1e-9 {
                best = energy;
                minimisers = vec![active];
            } else if (energy - best).abs() <= 1e-9 {
                minimisers.push(active);
            }
        }
        (best, minimisers)
    }

    fn sample_hubo() -> Polynomial {
        vec![
            (Term::new(vec![x(1), x(2), x(3)]), -10.0),
            (Term::new(vec![x(2), x(3), x(4)]), 4.0),
            (Term::single(x(1)), 1.0),
            (Term::single(x(2)), 1.0),
            (Term::single(x(3)), 1.0),
            (Term::single(x(4)), -0.5),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn quadratization_preserves_the_unique_minimiser() {
        let hubo = sample_hubo();
        let originals = vec![x(1), x(2), x(3), x(4)];
        let (hubo_min, hubo_minimisers) = brute_force(&hubo, &originals);
        assert_eq!(hubo_minimisers.len(), 1);

        let result = quadratize(&hubo, 20.0);
        assert!(result.qubo.max_degree() <= 2);

        let all: Vec<Variable> = result.qubo.variables().into_iter().collect();
        let (qubo_min, qubo_minimisers) = brute_force(&result.qubo, &all);

        assert!((hubo_min - qubo_min).abs() < 1e-9);
        assert_eq!(qubo_minimisers.len(), 1);
        let projected: BTreeSet<Variable> = qubo_minimisers[0]
            .iter()
            .filter(|v| !v.is_auxiliary())
            .copied()
            .collect();
        assert_eq!(projected, hubo_minimisers[0]);
    }

    #[test]
    fn shared_pair_is_reduced_with_a_single_auxiliary() {
        let result = quadratize(&sample_hubo(), 20.0);
        // (x2, x3) occurs in both cubic terms.
        assert_eq!(
            result.auxiliaries,
            vec![AuxiliaryDefinition {
                variable: Variable::Auxiliary(1),
                factors: (x(2), x(3)),
            }]
        );
        assert_eq!(
            result
                .qubo
                .coefficient(&Term::pair(x(1), Variable::Auxiliary(1))),
            Some(-10.0)
        );
        assert_eq!(
            result.qubo.coefficient(&Term::single(Variable::Auxiliary(1))),
            Some(60.0)
        );
    }

    #[test]
    fn quadratic_polynomials_pass_through_unchanged() {
        let p: Polynomial = vec![
            (Term::single(x(1)), -1.0),
            (Term::pair(x(1), x(2)), 2.0),
            (Term::pair(x(2), x(1)), 2.0),
        ]
        .into_iter()
        .collect();
        let result = quadratize(&p, 5.0);
        assert!(result.auxiliaries.is_empty());
        assert_eq!(result.qubo, p);
    }

    #[test]
    fn quartic_term_needs_two_auxiliaries() {
        let p: Polynomial = vec![(Term::new(vec![x(1), x(2), x(3), x(4)]), -1.0)]
            .into_iter()
            .collect();
        let result = quadratize(&p, 10.0);
        assert_eq!(result.auxiliaries.len(), 2);
        assert!(result.qubo.max_degree() <= 2);

        let all: Vec<Variable> = result.qubo.variables().into_iter().collect();
        let (min, _) = brute_force(&result.qubo, &all);
        assert!((min + 1.0).abs() < 1e-9);
    }

    #[test]
    fn substitute_keeps_first_position() {
        let mut vars = vec![x(1), x(2), x(3)];
        substitute(&mut vars, x(1), x(3), Variable::Auxiliary(1));
        assert_eq!(vars, vec![Variable::Auxiliary(1), x(2)]);
    }
}
