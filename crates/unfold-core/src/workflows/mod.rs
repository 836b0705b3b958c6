//! High-level entry points.
//!
//! A workflow ties the graph analysis, model construction and reconstruction
//! together for one molecule and reports its phases through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! - [`build`] builds an energy model for every combination of a parameter grid.
//! - [`reconstruct`] interprets solver samples for one model.

pub mod build;
pub mod reconstruct;
