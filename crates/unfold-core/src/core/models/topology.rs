use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
    Amide,
    Unknown,
}

impl BondOrder {
    /// Aromatic bonds are never considered for torsional rotation.
    #[inline]
    pub fn is_aromatic(&self) -> bool {
        matches!(self, Self::Aromatic)
    }

    /// The MOL2 bond type token for this order.
    pub fn to_mol2(&self) -> &'static str {
        match self {
            Self::Single => "1",
            Self::Double => "2",
            Self::Triple => "3",
            Self::Aromatic => "ar",
            Self::Amide => "am",
            Self::Unknown => "un",
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            "am" | "amide" => Ok(Self::Amide),
            "du" | "un" | "nc" | "unknown" => Ok(Self::Unknown),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
                Self::Amide => "Amide",
                Self::Unknown => "Unknown",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize,     // Serial of the first atom
    pub atom2: usize,     // Serial of the second atom
    pub order: BondOrder, // Bond order (e.g., single, aromatic, etc.)
}

impl Bond {
    pub fn new(atom1: usize, atom2: usize, order: BondOrder) -> Self {
        Self {
            atom1,
            atom2,
            order,
        }
    }

    /// The atom pair with the smaller serial first; equal for both directions.
    pub fn key(&self) -> (usize, usize) {
        (self.atom1.min(self.atom2), self.atom1.max(self.atom2))
    }

    /// The canonical bond name `"{atom1}_{atom2}"`, in the order the bond was declared.
    pub fn name(&self) -> String {
        format!("{}_{}", self.atom1, self.atom2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_order_from_str_parses_valid_strings() {
        assert_eq!("1".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("single".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("2".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("D".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("3".parse::<BondOrder>().unwrap(), BondOrder::Triple);
        assert_eq!("ar".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert_eq!("AR".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert_eq!("am".parse::<BondOrder>().unwrap(), BondOrder::Amide);
        assert_eq!("du".parse::<BondOrder>().unwrap(), BondOrder::Unknown);
        assert_eq!("nc".parse::<BondOrder>().unwrap(), BondOrder::Unknown);
    }

    #[test]
    fn bond_order_from_str_rejects_invalid_strings() {
        assert!("".parse::<BondOrder>().is_err());
        assert!("quadruple".parse::<BondOrder>().is_err());
        assert!("0".parse::<BondOrder>().is_err());
    }

    #[test]
    fn only_aromatic_order_is_aromatic() {
        assert!(BondOrder::Aromatic.is_aromatic());
        assert!(!BondOrder::Single.is_aromatic());
        assert!(!BondOrder::Double.is_aromatic());
        assert!(!BondOrder::Amide.is_aromatic());
    }

    #[test]
    fn mol2_token_round_trips_through_from_str() {
        for order in [
            BondOrder::Single,
            BondOrder::Double,
            BondOrder::Triple,
            BondOrder::Aromatic,
            BondOrder::Amide,
            BondOrder::Unknown,
        ] {
            assert_eq!(order.to_mol2().parse::<BondOrder>().unwrap(), order);
        }
    }

    #[test]
    fn bond_name_keeps_declaration_order() {
        let bond = Bond::new(12, 3, BondOrder::Single);
        assert_eq!(bond.name(), "12_3");
    }

    #[test]
    fn bond_key_ignores_direction() {
        let forward = Bond::new(10, 20, BondOrder::Single);
        let backward = Bond::new(20, 10, BondOrder::Double);
        assert_eq!(forward.key(), (10, 20));
        assert_eq!(forward.key(), backward.key());
    }
}
