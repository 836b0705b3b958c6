use crate::core::torsion::variables::Variable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// One solver answer: an energy and the variables set to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub energy: f64,
    /// How many times the solver returned this assignment.
    pub occurrences: usize,
    pub active: BTreeSet<Variable>,
}

impl Sample {
    pub fn new(energy: f64, active: impl IntoIterator<Item = Variable>) -> Self {
        Self {
            energy,
            occurrences: 1,
            active: active.into_iter().collect(),
        }
    }

    pub fn with_occurrences(mut self, occurrences: usize) -> Self {
        self.occurrences = occurrences;
        self
    }

    pub fn is_active(&self, variable: &Variable) -> bool {
        self.active.contains(variable)
    }

    /// Orders samples by ascending energy; NaN energies sort last.
    pub fn cmp_by_energy(&self, other: &Self) -> Ordering {
        match (self.energy.is_nan(), other.energy.is_nan()) {
            (false, false) => self.energy.total_cmp(&other.energy),
            (a, b) => a.cmp(&b),
        }
    }
}

/// Sorts samples by ascending energy, keeping solver order among equal energies.
pub fn rank_samples(samples: &mut [Sample]) {
    samples.sort_by(Sample::cmp_by_energy);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_is_by_ascending_energy_and_stable() {
        let v = |step| Variable::Torsion { family: 1, step };
        let mut samples = vec![
            Sample::new(f64::NAN, [v(4)]),
            Sample::new(-1.0, [v(1)]),
            Sample::new(-5.0, [v(2)]),
            Sample::new(-1.0, [v(3)]),
        ];

        rank_samples(&mut samples);

        assert_eq!(samples[0].energy, -5.0);
        assert!(samples[1].is_active(&v(1)));
        assert!(samples[2].is_active(&v(3)));
        assert!(samples[3].energy.is_nan());
    }
}
