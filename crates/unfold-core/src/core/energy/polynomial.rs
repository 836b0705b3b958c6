use crate::core::torsion::variables::Variable;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::AddAssign;

/// An ordered product of binary variables.
///
/// Order is significant for identity: `(u, v)` and `(v, u)` are distinct keys,
/// matching the full-matrix form of a QUBO.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Term(Vec<Variable>);

impl Term {
    pub fn new(variables: Vec<Variable>) -> Self {
        Self(variables)
    }

    pub fn single(variable: Variable) -> Self {
        Self(vec![variable])
    }

    pub fn pair(first: Variable, second: Variable) -> Self {
        Self(vec![first, second])
    }

    pub fn variables(&self) -> &[Variable] {
        &self.0
    }

    pub fn degree(&self) -> usize {
        self.0.len()
    }

    /// Degree counting each distinct variable once (`x·x = x` for binaries).
    pub fn distinct_degree(&self) -> usize {
        self.0.iter().unique().count()
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.0.contains(variable)
    }

    /// A term evaluates to 1 iff all of its variables are 1.
    pub fn is_satisfied_by(&self, active: &BTreeSet<Variable>) -> bool {
        self.0.iter().all(|v| active.contains(v))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

/// A pseudo-boolean polynomial: a map from terms to real coefficients.
///
/// Used both for the higher-order model (HUBO) and its quadratic reduction (QUBO).
/// Adding a coefficient to an existing term accumulates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polynomial {
    terms: BTreeMap<Term, f64>,
}

impl Polynomial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, term: Term, coefficient: f64) {
        *self.terms.entry(term).or_insert(0.0) += coefficient;
    }

    pub fn coefficient(&self, term: &Term) -> Option<f64> {
        self.terms.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &f64)> + Clone {
        self.terms.iter()
    }

    pub fn max_degree(&self) -> usize {
        self.terms.keys().map(Term::degree).max().unwrap_or(0)
    }

    /// Number of terms of each degree, keyed by degree.
    pub fn degree_histogram(&self) -> BTreeMap<usize, usize> {
        self.terms.keys().map(Term::degree).counts().into_iter().collect()
    }

    /// All variables appearing in any term, in order.
    pub fn variables(&self) -> BTreeSet<Variable> {
        self.terms
            .keys()
            .flat_map(|t| t.variables().iter().copied())
            .collect()
    }

    /// Evaluates the polynomial for the assignment in which exactly `active` are 1.
    pub fn energy(&self, active: &BTreeSet<Variable>) -> f64 {
        self.terms
            .iter()
            .filter(|(term, _)| term.is_satisfied_by(active))
            .map(|(_, c)| c)
            .sum()
    }
}

impl AddAssign<&Polynomial> for Polynomial {
    fn add_assign(&mut self, rhs: &Polynomial) {
        for (term, &coefficient) in &rhs.terms {
            self.add_term(term.clone(), coefficient);
        }
    }
}

impl Extend<(Term, f64)> for Polynomial {
    fn extend<I: IntoIterator<Item = (Term, f64)>>(&mut self, iter: I) {
        for (term, coefficient) in iter {
            self.add_term(term, coefficient);
        }
    }
}

impl FromIterator<(Term, f64)> for Polynomial {
    fn from_iter<I: IntoIterator<Item = (Term, f64)>>(iter: I) -> Self {
        let mut polynomial = Polynomial::new();
        polynomial.extend(iter);
        polynomial
    }
}

impl IntoIterator for Polynomial {
    type Item = (Term, f64);
    type IntoIter = std::collections::btree_map::IntoIter<Term, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(family: usize, step: usize) -> Variable {
        Variable::Torsion { family, step }
    }

    #[test]
    fn adding_to_existing_term_accumulates() {
        let mut p = Polynomial::new();
        p.add_term(Term::single(x(1, 1)), -2.0);
        p.add_term(Term::single(x(1, 1)), 0.5);
        assert_eq!(p.len(), 1);
        assert_eq!(p.coefficient(&Term::single(x(1, 1))), Some(-1.5));
    }

    #[test]
    fn ordered_pairs_are_distinct_terms() {
        let mut p = Polynomial::new();
        p.add_term(Term::pair(x(1, 1), x(1, 2)), 1.0);
        p.add_term(Term::pair(x(1, 2), x(1, 1)), 1.0);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn energy_sums_satisfied_terms() {
        let p: Polynomial = vec![
            (Term::single(x(1, 1)), -3.0),
            (Term::pair(x(1, 1), x(2, 1)), 5.0),
            (Term::new(vec![x(1, 1), x(2, 1), x(3, 1)]), -7.0),
        ]
        .into_iter()
        .collect();

        let active: BTreeSet<Variable> = [x(1, 1), x(2, 1)].into_iter().collect();
        assert_eq!(p.energy(&active), 2.0);
        let all: BTreeSet<Variable> = [x(1, 1), x(2, 1), x(3, 1)].into_iter().collect();
        assert_eq!(p.energy(&all), -5.0);
        assert_eq!(p.energy(&BTreeSet::new()), 0.0);
    }

    #[test]
    fn merge_is_additive() {
        let mut a: Polynomial = vec![(Term::single(x(1, 1)), 1.0)].into_iter().collect();
        let b: Polynomial = vec![
            (Term::single(x(1, 1)), 2.0),
            (Term::single(x(1, 2)), 4.0),
        ]
        .into_iter()
        .collect();
        a += &b;
        assert_eq!(a.coefficient(&Term::single(x(1, 1))), Some(3.0));
        assert_eq!(a.coefficient(&Term::single(x(1, 2))), Some(4.0));
    }

    #[test]
    fn degree_statistics() {
        let p: Polynomial = vec![
            (Term::single(x(1, 1)), 1.0),
            (Term::pair(x(1, 1), x(1, 2)), 1.0),
            (Term::new(vec![x(1, 1), x(2, 1), x(3, 1)]), 1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(p.max_degree(), 3);
        assert_eq!(
            p.degree_histogram(),
            BTreeMap::from([(1, 1), (2, 1), (3, 1)])
        );
        assert_eq!(Term::new(vec![x(1, 1), x(1, 1)]).distinct_degree(), 1);
        assert_eq!(Term::pair(x(1, 1), x(2, 3)).to_string(), "(x_1_1, x_2_3)");
    }
}
