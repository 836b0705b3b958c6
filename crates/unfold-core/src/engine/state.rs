use crate::core::models::conformation::Conformation;
use serde::Serialize;
use std::fmt;

/// The angle decoded for one rotatable bond.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChosenTorsion {
    pub family: usize,
    pub bond: String,
    pub step: usize,
    pub angle_degrees: f64,
}

/// A sample that did not encode exactly one step for a bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// No step of the family was active; step 1 was assumed.
    MissingVariable { family: usize, bond: String },
    /// Several steps were active; the lowest one was used.
    MultipleActive {
        family: usize,
        bond: String,
        steps: Vec<usize>,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariable { bond, .. } => {
                write!(f, "no active step for bond {}, assumed step 1", bond)
            }
            Self::MultipleActive { bond, steps, .. } => {
                write!(f, "bond {} has several active steps {:?}", bond, steps)
            }
        }
    }
}

/// Why the initial conformation was returned instead of a rotated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    NoSamples,
    NoImprovement,
    Infeasible,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoSamples => "no samples were provided",
            Self::NoImprovement => "the best feasible sample does not improve unfolding",
            Self::Infeasible => "no inspected sample was free of clashes",
        };
        f.write_str(text)
    }
}

/// The outcome of interpreting solver samples for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub conformation: Conformation,
    /// Unfolding ratio of the result against the initial conformation.
    pub gain: f64,
    pub feasible: bool,
    /// One entry per model bond; empty when a fallback applies.
    pub torsions: Vec<ChosenTorsion>,
    /// 0-based rank of the accepted sample after sorting by energy.
    pub sample_rank: Option<usize>,
    pub anomalies: Vec<Anomaly>,
    pub fallback: Option<Fallback>,
    /// How many samples were inspected.
    pub inspected: usize,
}

impl Reconstruction {
    /// The initial conformation, reported with a neutral gain.
    pub fn unchanged(initial: Conformation, fallback: Fallback, inspected: usize) -> Self {
        Self {
            conformation: initial,
            gain: 1.0,
            feasible: fallback != Fallback::Infeasible,
            torsions: Vec::new(),
            sample_rank: None,
            anomalies: Vec::new(),
            fallback: Some(fallback),
            inspected,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}
