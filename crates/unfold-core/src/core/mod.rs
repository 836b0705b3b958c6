//! # Core Module
//!
//! The stateless building blocks of molunfold.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, molecules and conformations
//! - **Graph Analysis** ([`graph`]) - Betweenness centrality and rotatable-bond discovery
//! - **Rotation Groups** ([`torsion`]) - Cut sets of bonds and the binary variables encoding their angles
//! - **Energy Polynomials** ([`energy`]) - HUBO/QUBO terms, quadratization and solver samples
//! - **File I/O** ([`io`]) - MOL2 molecules, CSV sample tables and JSON model files
//! - **Geometry** ([`utils`]) - Rotations about bond axes and centroid distances

pub mod energy;
pub mod graph;
pub mod io;
pub mod models;
pub mod torsion;
pub mod utils;
