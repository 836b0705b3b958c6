//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent
//! molecules in molunfold.
//!
//! ## Overview
//!
//! The models describe a molecule as it comes out of a structure file: atoms
//! with coordinates and van der Waals radii, and the bonds between them. They
//! are immutable once built. Everything the unfolding engine changes is
//! expressed as a separate [`conformation::Conformation`].
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom representation with coordinates, element, and radius
//! - [`element`] - Static element tables (van der Waals radii)
//! - [`topology`] - Bonds and bond orders
//! - [`molecule`] - A validated collection of atoms and bonds with serial lookup
//! - [`conformation`] - Atom positions derived from a molecule by rotations
//!
//! ## Usage
//!
//! ```ignore
//! use molunfold::core::models::{atom::Atom, molecule::Molecule, topology::{Bond, BondOrder}};
//!
//! let atoms = vec![
//!     Atom::new(1, "C1", "C", Point3::new(0.0, 0.0, 0.0)),
//!     Atom::new(2, "C2", "C", Point3::new(1.5, 0.0, 0.0)),
//! ];
//! let molecule = Molecule::new("ethane", atoms, vec![Bond::new(1, 2, BondOrder::Single)])?;
//! ```

pub mod atom;
pub mod conformation;
pub mod element;
pub mod molecule;
pub mod topology;
