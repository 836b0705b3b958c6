//! # Engine Module
//!
//! Builds energy models and interprets solver answers.
//!
//! ## Overview
//!
//! A [`context::BuildContext`] analyses a molecule once: its rotatable bonds and
//! the rotation groups up to the largest complexity needed. The
//! [`builder::EnergyModelBuilder`] then turns one parameter tuple into an
//! [`builder::EnergyModel`]: one-hot constraints per bond, distance rewards per
//! rotation group, and the quadratized QUBO. Models are shared through the
//! [`cache::ModelCache`]. The [`reconstruct::ConformationReconstructor`] maps
//! solver samples back onto the molecule.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Model parameters, build grids and reconstruction options
//! - **State** ([`state`]) - Reconstruction results, anomalies and fallbacks
//! - **Progress Monitoring** ([`progress`]) - Progress reporting for long-running phases
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod builder;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod reconstruct;
pub mod rotation;
pub mod state;
pub(crate) mod tasks;
