use crate::core::energy::polynomial::{Polynomial, Term};
use crate::core::torsion::variables::VariableMapping;
use tracing::debug;

/// Builds the one-hot penalty for every bond family of a mapping.
///
/// For each family and each ordered pair of steps `(d1, d2)`: the linear term
/// `x_d1` receives `-strength` when `d1 == d2`, and the quadratic term
/// `(x_d1, x_d2)` receives `+strength` otherwise. The penalty is minimal, at
/// `-strength` per family, exactly when one variable of the family is active.
pub fn one_hot_constraints(mapping: &VariableMapping, strength: f64) -> Polynomial {
    let mut polynomial = Polynomial::new();
    for family in 1..=mapping.family_count() {
        let variables = mapping.variables_of(family);
        for (i, &first) in variables.iter().enumerate() {
            for (j, &second) in variables.iter().enumerate() {
                if i == j {
                    polynomial.add_term(Term::single(first), -strength);
                } else {
                    polynomial.add_term(Term::pair(first, second), strength);
                }
            }
        }
    }
    debug!(
        families = mapping.family_count(),
        terms = polynomial.len(),
        "Built one-hot constraints."
    );
    polynomial
}
