//! Numerical helpers shared by the graph, torsion, and engine layers.

pub mod geometry;
