//! # molunfold Core Library
//!
//! Energy-model construction for molecular unfolding on annealing solvers.
//!
//! A molecule is unfolded by choosing one discretised angle for each of its most
//! important rotatable bonds so that the molecule is as extended as possible.
//! This library turns that search into a quadratic unconstrained binary
//! optimisation (QUBO) problem, and turns the solver's answers back into
//! coordinates.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`,
//!   `Conformation`), graph analysis (`MoleculeGraph`), rotation-group
//!   enumeration, energy polynomials and their quadratization, and I/O.
//!
//! - **[`engine`]: The Logic Core.** Builds energy models from a shared
//!   `BuildContext`, caches them by parameter key, and reconstructs
//!   conformations from solver samples.
//!
//! - **[`workflows`]: The Public API.** Complete procedures over one molecule:
//!   building a grid of models, and interpreting samples for one model.

pub mod core;
pub mod engine;
pub mod workflows;
