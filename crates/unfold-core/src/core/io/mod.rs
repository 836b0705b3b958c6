//! Provides input/output functionality for molecules, solver samples, and built models.
//!
//! Molecules are read and written through the [`traits::MolecularFile`] interface
//! (currently Tripos MOL2). Solver answers arrive as CSV sample tables, and built
//! energy models are persisted as versioned JSON documents.

pub mod model_file;
pub mod mol2;
pub mod samples;
pub mod traits;
