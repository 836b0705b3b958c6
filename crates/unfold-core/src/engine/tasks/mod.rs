//! Computational units used while building and interpreting energy models.
//!
//! Each task is a plain function over borrowed inputs. Tasks that fan out over
//! independent work items use rayon when the `parallel` feature is enabled.

pub mod clash_detection;
pub mod constraints;
pub mod distances;
