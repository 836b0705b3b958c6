//! # Energy Polynomial Module
//!
//! Pseudo-boolean polynomials over torsion and auxiliary variables, and the
//! reduction of higher-order polynomials to quadratic form.
//!
//! - [`polynomial`] - [`polynomial::Term`] and [`polynomial::Polynomial`], with evaluation and additive merging
//! - [`quadratize`] - HUBO → QUBO reduction by auxiliary-variable substitution
//! - [`sample`] - Solver answers evaluated against a model

pub mod polynomial;
pub mod quadratize;
pub mod sample;
