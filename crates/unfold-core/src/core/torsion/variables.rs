use crate::core::graph::RotatableBond;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A binary decision variable of the energy model.
///
/// `Torsion { family, step }` is 1 when bond family `family` (1-based) is rotated
/// to discretisation step `step` (1-based). `Auxiliary(n)` stands for the product
/// of two other variables introduced during quadratization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Variable {
    Torsion { family: usize, step: usize },
    Auxiliary(usize),
}

impl Variable {
    pub fn is_auxiliary(&self) -> bool {
        matches!(self, Variable::Auxiliary(_))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Torsion { family, step } => write!(f, "x_{}_{}", family, step),
            Variable::Auxiliary(n) => write!(f, "aux_{}", n),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid variable name: '{0}'")]
pub struct ParseVariableError(pub String);

impl FromStr for Variable {
    type Err = ParseVariableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVariableError(s.to_string());
        if let Some(rest) = s.strip_prefix("aux_") {
            return rest.parse().map(Variable::Auxiliary).map_err(|_| err());
        }
        let rest = s.strip_prefix("x_").ok_or_else(err)?;
        let (family, step) = rest.split_once('_').ok_or_else(err)?;
        let family: usize = family.parse().map_err(|_| err())?;
        let step: usize = step.parse().map_err(|_| err())?;
        if family == 0 || step == 0 {
            return Err(err());
        }
        Ok(Variable::Torsion { family, step })
    }
}

impl From<Variable> for String {
    fn from(variable: Variable) -> Self {
        variable.to_string()
    }
}

impl TryFrom<String> for Variable {
    type Error = ParseVariableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("The number of discretisation steps must be at least 1")]
    ZeroSteps,
    #[error("Bond '{0}' appears more than once")]
    DuplicateBond(String),
}

/// Bijection between rotatable bonds and their torsion variables.
///
/// Family indices are the 1-based catalogue positions of the bonds. Every family
/// owns exactly `steps` variables, one per discretised angle.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMapping {
    steps: usize,
    bond_names: Vec<String>,
    family_by_name: HashMap<String, usize>,
}

impl VariableMapping {
    pub fn new(bonds: &[RotatableBond], steps: usize) -> Result<Self, MappingError> {
        Self::from_names(bonds.iter().map(|b| b.name.clone()).collect(), steps)
    }

    /// Rebuilds a mapping from bond names in family order.
    pub fn from_names(bond_names: Vec<String>, steps: usize) -> Result<Self, MappingError> {
        if steps == 0 {
            return Err(MappingError::ZeroSteps);
        }
        let mut family_by_name = HashMap::with_capacity(bond_names.len());
        for (idx, name) in bond_names.iter().enumerate() {
            if family_by_name.insert(name.clone(), idx + 1).is_some() {
                return Err(MappingError::DuplicateBond(name.clone()));
            }
        }
        Ok(Self {
            steps,
            bond_names,
            family_by_name,
        })
    }

    /// Number of discretisation steps per bond (`D`).
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn family_count(&self) -> usize {
        self.bond_names.len()
    }

    /// Total number of torsion variables.
    pub fn variable_count(&self) -> usize {
        self.bond_names.len() * self.steps
    }

    pub fn bond_names(&self) -> &[String] {
        &self.bond_names
    }

    pub fn family_of(&self, bond_name: &str) -> Option<usize> {
        self.family_by_name.get(bond_name).copied()
    }

    pub fn bond_name(&self, family: usize) -> Option<&str> {
        family
            .checked_sub(1)
            .and_then(|idx| self.bond_names.get(idx))
            .map(String::as_str)
    }

    pub fn variable(&self, family: usize, step: usize) -> Option<Variable> {
        let valid = (1..=self.family_count()).contains(&family) && (1..=self.steps).contains(&step);
        valid.then_some(Variable::Torsion { family, step })
    }

    /// Resolves a torsion variable back to `(family, step)`.
    ///
    /// Auxiliary variables and variables outside this mapping yield `None`.
    pub fn decode(&self, variable: &Variable) -> Option<(usize, usize)> {
        match *variable {
            Variable::Torsion { family, step } => {
                self.variable(family, step).map(|_| (family, step))
            }
            Variable::Auxiliary(_) => None,
        }
    }

    /// All variables of one family, in step order.
    pub fn variables_of(&self, family: usize) -> Vec<Variable> {
        (1..=self.steps)
            .filter_map(|step| self.variable(family, step))
            .collect()
    }

    /// All torsion variables, family-major.
    pub fn all_variables(&self) -> Vec<Variable> {
        (1..=self.family_count())
            .flat_map(|family| self.variables_of(family))
            .collect()
    }

    /// Rotation angle in degrees for a step: step 1 is the unrotated position.
    pub fn angle_degrees(&self, step: usize) -> f64 {
        step.saturating_sub(1) as f64 * 360.0 / self.steps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}_{}", i, i + 1)).collect()
    }

    #[test]
    fn variables_display_and_parse() {
        let torsion = Variable::Torsion { family: 2, step: 7 };
        assert_eq!(torsion.to_string(), "x_2_7");
        assert_eq!("x_2_7".parse::<Variable>(), Ok(torsion));
        assert_eq!("aux_3".parse::<Variable>(), Ok(Variable::Auxiliary(3)));
        assert!("x_0_1".parse::<Variable>().is_err());
        assert!("x_1".parse::<Variable>().is_err());
        assert!("y_1_1".parse::<Variable>().is_err());
    }

    #[test]
    fn variables_serialize_as_names() {
        let json = serde_json::to_string(&Variable::Torsion { family: 1, step: 3 }).unwrap();
        assert_eq!(json, "\"x_1_3\"");
        let back: Variable = serde_json::from_str("\"aux_12\"").unwrap();
        assert_eq!(back, Variable::Auxiliary(12));
    }

    #[test]
    fn mapping_is_a_bijection() {
        let mapping = VariableMapping::from_names(names(3), 4).unwrap();
        assert_eq!(mapping.variable_count(), 12);

        let all = mapping.all_variables();
        let mut unique = all.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 12);

        for variable in all {
            let (family, step) = mapping.decode(&variable).unwrap();
            assert_eq!(mapping.variable(family, step), Some(variable));
        }
        assert_eq!(mapping.family_of("2_3"), Some(2));
        assert_eq!(mapping.bond_name(2), Some("2_3"));
        assert_eq!(mapping.bond_name(0), None);
    }

    #[test]
    fn out_of_range_lookups_fail() {
        let mapping = VariableMapping::from_names(names(1), 8).unwrap();
        assert_eq!(mapping.variable(1, 9), None);
        assert_eq!(mapping.variable(2, 1), None);
        assert_eq!(mapping.decode(&Variable::Auxiliary(1)), None);
        assert_eq!(
            mapping.decode(&Variable::Torsion { family: 1, step: 0 }),
            None
        );
    }

    #[test]
    fn angles_start_at_zero() {
        let mapping = VariableMapping::from_names(names(1), 8).unwrap();
        assert_eq!(mapping.angle_degrees(1), 0.0);
        assert_eq!(mapping.angle_degrees(2), 45.0);
        assert_eq!(mapping.angle_degrees(8), 315.0);
    }

    #[test]
    fn invalid_mappings_are_rejected() {
        assert_eq!(
            VariableMapping::from_names(names(1), 0),
            Err(MappingError::ZeroSteps)
        );
        assert_eq!(
            VariableMapping::from_names(vec!["1_2".into(), "1_2".into()], 2),
            Err(MappingError::DuplicateBond("1_2".into()))
        );
    }
}
