//! # Molecular Graph Module
//!
//! Bond-graph analysis of a [`Molecule`]: betweenness centrality of every atom and
//! the catalogue of rotatable bonds, each of which splits the molecule into two
//! rigid fragments.
//!
//! A bond is rotatable when it is not aromatic, when masking it out leaves the
//! molecule in exactly two connected components (ring bonds never do, and nor does
//! any bond of a molecule that is already split into separate pieces), and when
//! neither of its atoms is terminal.
//! Rotating about a bond to a terminal atom moves nothing off the bond axis, so
//! such bonds carry no conformational freedom.

pub mod centrality;

use crate::core::models::molecule::Molecule;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Centrality below this value marks an atom as terminal.
const TERMINAL_CENTRALITY_EPSILON: f64 = 1e-12;

/// Identifies one of the two fragments created by cutting a rotatable bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FragmentSide {
    /// The fragment containing the bond's first atom.
    Zero,
    /// The fragment containing the bond's second atom.
    One,
}

impl FragmentSide {
    pub fn opposite(self) -> Self {
        match self {
            FragmentSide::Zero => FragmentSide::One,
            FragmentSide::One => FragmentSide::Zero,
        }
    }
}

/// A bond about which part of the molecule can be rigidly rotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotatableBond {
    /// `"{atom1}_{atom2}"`, using atom serials in bond declaration order.
    pub name: String,
    /// Serial of the bond's first atom.
    pub atom1: usize,
    /// Serial of the bond's second atom.
    pub atom2: usize,
    /// Dense index of `atom1`.
    pub index1: usize,
    /// Dense index of `atom2`.
    pub index2: usize,
    /// Mean betweenness centrality of the two endpoints.
    pub score: f64,
    /// Dense indices (sorted) of the atoms on `atom1`'s side, including `atom1`.
    pub fragment_0: Vec<usize>,
    /// Dense indices (sorted) of the atoms on `atom2`'s side, including `atom2`.
    pub fragment_1: Vec<usize>,
}

impl RotatableBond {
    pub fn fragment(&self, side: FragmentSide) -> &[usize] {
        match side {
            FragmentSide::Zero => &self.fragment_0,
            FragmentSide::One => &self.fragment_1,
        }
    }

    /// Returns which fragment holds the atom at `index`, or `None` for an index
    /// outside the molecule.
    pub fn side_of(&self, index: usize) -> Option<FragmentSide> {
        if self.fragment_0.binary_search(&index).is_ok() {
            Some(FragmentSide::Zero)
        } else if self.fragment_1.binary_search(&index).is_ok() {
            Some(FragmentSide::One)
        } else {
            None
        }
    }

    /// Dense index of the endpoint lying in the given fragment.
    pub fn endpoint(&self, side: FragmentSide) -> usize {
        match side {
            FragmentSide::Zero => self.index1,
            FragmentSide::One => self.index2,
        }
    }
}

/// The analysed bond graph of a molecule.
#[derive(Debug, Clone)]
pub struct MoleculeGraph<'a> {
    molecule: &'a Molecule,
    adjacency: Vec<Vec<usize>>,
    centrality: Vec<f64>,
    rotatable_bonds: Vec<RotatableBond>,
}

impl<'a> MoleculeGraph<'a> {
    /// Analyses the molecule's bond graph and discovers its rotatable bonds.
    ///
    /// Rotatable bonds are ordered by descending score; bonds with equal scores
    /// keep their declaration order. A molecule without any rotatable bond is a
    /// valid, degenerate result.
    pub fn build(molecule: &'a Molecule) -> Self {
        let adjacency = build_adjacency(molecule);
        let centrality = centrality::betweenness_centrality(&adjacency);

        let mut rotatable_bonds = Vec::new();
        for bond in molecule.bonds() {
            if bond.order.is_aromatic() {
                trace!(bond = %bond.name(), "Skipping aromatic bond.");
                continue;
            }
            // Validated molecules never carry dangling bonds.
            let (Some(i), Some(j)) = (molecule.index_of(bond.atom1), molecule.index_of(bond.atom2))
            else {
                continue;
            };

            let Some((fragment_0, fragment_1)) = split_at_edge(&adjacency, i, j) else {
                trace!(bond = %bond.name(), "Skipping bond that does not split the molecule in two.");
                continue;
            };

            if centrality[i] < TERMINAL_CENTRALITY_EPSILON
                || centrality[j] < TERMINAL_CENTRALITY_EPSILON
            {
                trace!(bond = %bond.name(), "Skipping bond to a terminal atom.");
                continue;
            }

            rotatable_bonds.push(RotatableBond {
                name: bond.name(),
                atom1: bond.atom1,
                atom2: bond.atom2,
                index1: i,
                index2: j,
                score: (centrality[i] + centrality[j]) / 2.0,
                fragment_0,
                fragment_1,
            });
        }

        // Stable sort keeps declaration order among equal scores.
        rotatable_bonds.sort_by(|a, b| b.score.total_cmp(&a.score));

        if rotatable_bonds.is_empty() {
            warn!(
                molecule = molecule.name(),
                "Molecule has no rotatable bonds; every model built from it will be empty."
            );
        } else {
            debug!(
                molecule = molecule.name(),
                count = rotatable_bonds.len(),
                "Discovered rotatable bonds."
            );
        }

        Self {
            molecule,
            adjacency,
            centrality,
            rotatable_bonds,
        }
    }

    pub fn molecule(&self) -> &'a Molecule {
        self.molecule
    }

    /// Rotatable bonds, highest score first.
    pub fn rotatable_bonds(&self) -> &[RotatableBond] {
        &self.rotatable_bonds
    }

    pub fn bond(&self, name: &str) -> Option<&RotatableBond> {
        self.rotatable_bonds.iter().find(|b| b.name == name)
    }

    /// Betweenness centrality of the atom with the given serial.
    pub fn centrality(&self, serial: usize) -> Option<f64> {
        self.molecule
            .index_of(serial)
            .map(|idx| self.centrality[idx])
    }

    /// Whether the atoms at two dense indices share a bond.
    pub fn are_bonded(&self, i: usize, j: usize) -> bool {
        self.adjacency
            .get(i)
            .is_some_and(|neighbors| neighbors.binary_search(&j).is_ok())
    }
}

fn build_adjacency(molecule: &Molecule) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); molecule.len()];
    for bond in molecule.bonds() {
        if let (Some(i), Some(j)) = (molecule.index_of(bond.atom1), molecule.index_of(bond.atom2)) {
            adjacency[i].push(j);
            adjacency[j].push(i);
        }
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    adjacency
}

/// Collects the atoms reachable from `start` without traversing the edge `masked`.
fn reachable_without_edge(
    adjacency: &[Vec<usize>],
    start: usize,
    masked: (usize, usize),
) -> Vec<bool> {
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(current) = queue.pop_front() {
        for &next in &adjacency[current] {
            let is_masked = (current == masked.0 && next == masked.1)
                || (current == masked.1 && next == masked.0);
            if is_masked || visited[next] {
                continue;
            }
            visited[next] = true;
            queue.push_back(next);
        }
    }
    visited
}

/// Splits the molecule in two by masking the edge `(i, j)`.
///
/// Returns `None` unless the masked graph has exactly two components: when `i`
/// and `j` stay connected (a ring edge), or when some atom reaches neither of
/// them (the molecule already had several pieces).
fn split_at_edge(adjacency: &[Vec<usize>], i: usize, j: usize) -> Option<(Vec<usize>, Vec<usize>)> {
    let from_i = reachable_without_edge(adjacency, i, (i, j));
    if from_i[j] {
        return None;
    }
    let from_j = reachable_without_edge(adjacency, j, (i, j));
    if from_i.iter().zip(&from_j).any(|(&a, &b)| !a && !b) {
        return None;
    }

    let collect = |visited: &[bool]| -> Vec<usize> {
        visited
            .iter()
            .enumerate()
            .filter_map(|(idx, &seen)| seen.then_some(idx))
            .collect()
    };
    Some((collect(&from_i), collect(&from_j)))
}
