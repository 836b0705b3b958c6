use super::progress::ProgressReporter;
use crate::core::graph::MoleculeGraph;
use crate::core::models::conformation::Conformation;
use crate::core::models::molecule::Molecule;
use crate::core::torsion::catalogue::TorsionCatalogue;

/// Shared, read-only inputs for building energy models of one molecule.
///
/// The graph analysis and the rotation-group catalogue are computed once and
/// reused by every model built from the same context.
pub struct BuildContext<'a> {
    pub molecule: &'a Molecule,
    pub graph: MoleculeGraph<'a>,
    pub catalogue: TorsionCatalogue,
    /// Original atom positions; every group evaluation starts from a copy.
    pub base: Conformation,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> BuildContext<'a> {
    /// Analyses `molecule` and enumerates rotation groups up to level `max_m`.
    pub fn new(molecule: &'a Molecule, max_m: usize, reporter: &'a ProgressReporter<'a>) -> Self {
        let graph = MoleculeGraph::build(molecule);
        let catalogue = TorsionCatalogue::build(&graph, max_m);
        Self {
            molecule,
            graph,
            catalogue,
            base: molecule.conformation(),
            reporter,
        }
    }

    /// The effective complexity for a requested `m`: never more than the number
    /// of rotatable bonds.
    pub fn effective_m(&self, requested: usize) -> usize {
        requested.min(self.graph.rotatable_bonds().len())
    }
}
