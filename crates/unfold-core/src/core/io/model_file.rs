use crate::core::energy::polynomial::{Polynomial, Term};
use crate::core::energy::quadratize::AuxiliaryDefinition;
use crate::core::graph::RotatableBond;
use crate::core::torsion::group::RotationGroup;
use crate::core::torsion::variables::Variable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Schema version written by this build.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ModelFileError {
    #[error("Failed to access model file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed model document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported model format version {found} (this build reads version {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamsRecord {
    pub m: usize,
    pub d: usize,
    pub a: f64,
    pub hq: f64,
}

/// The variables owned by one rotatable bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyRecord {
    pub family: usize,
    pub bond: String,
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: Term,
    pub coefficient: f64,
}

/// Flattens a polynomial into explicit `{ term, coefficient }` records.
pub fn polynomial_to_records(polynomial: &Polynomial) -> Vec<TermRecord> {
    polynomial
        .iter()
        .map(|(term, &coefficient)| TermRecord {
            term: term.clone(),
            coefficient,
        })
        .collect()
}

pub fn records_to_polynomial(records: &[TermRecord]) -> Polynomial {
    records
        .iter()
        .map(|r| (r.term.clone(), r.coefficient))
        .collect()
}

/// The persisted form of a built energy model.
///
/// Carries everything result interpretation needs without rebuilding the model:
/// the variable tables, the rotatable bonds with their fragments, the rotation
/// groups of the model's level, the auxiliary definitions, and the polynomials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub format_version: u32,
    pub molecule: String,
    pub params: ParamsRecord,
    pub effective_m: usize,
    pub families: Vec<FamilyRecord>,
    pub bonds: Vec<RotatableBond>,
    pub groups: Vec<RotationGroup>,
    pub auxiliaries: Vec<AuxiliaryDefinition>,
    pub constraints: Vec<TermRecord>,
    pub distances: Vec<TermRecord>,
    pub qubo: Vec<TermRecord>,
}

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

impl ModelFile {
    pub fn to_json(&self) -> Result<String, ModelFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a model document, rejecting unknown format versions before the body.
    pub fn from_json(content: &str) -> Result<Self, ModelFileError> {
        let probe: VersionProbe = serde_json::from_str(content)?;
        if probe.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelFileError::UnsupportedVersion {
                found: probe.format_version,
                supported: MODEL_FORMAT_VERSION,
            });
        }
        Ok(serde_json::from_str(content)?)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelFileError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| ModelFileError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelFileError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ModelFileError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}
