//! # Torsion Module
//!
//! Combinations of rotatable bonds and the binary variables that encode their angles.
//!
//! - [`group`] - [`group::RotationGroup`], a cut set of bonds separating two atom sets
//! - [`catalogue`] - Ranked enumeration of rotation groups per complexity level
//! - [`variables`] - Torsion/auxiliary variables and the bond ↔ variable mapping

pub mod catalogue;
pub mod group;
pub mod variables;
