use super::group::RotationGroup;
use crate::core::graph::{FragmentSide, MoleculeGraph, RotatableBond};
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The ranked rotation groups of a molecule for every complexity level up to a maximum.
///
/// Level `m` considers the `m` highest-ranked rotatable bonds. Its groups are the
/// distinct non-empty cut sets over all pairs of atoms, ranked by size, then by
/// descending mean bond score, then by name.
#[derive(Debug, Clone)]
pub struct TorsionCatalogue {
    bonds: Vec<RotatableBond>,
    levels: Vec<Vec<RotationGroup>>,
}

impl TorsionCatalogue {
    /// Enumerates rotation groups for levels `1..=m_max`.
    ///
    /// `m_max` is clamped to the number of rotatable bonds.
    #[instrument(skip_all, name = "torsion_catalogue")]
    pub fn build(graph: &MoleculeGraph, m_max: usize) -> Self {
        let bonds = graph.rotatable_bonds().to_vec();
        let effective = m_max.min(bonds.len());
        if effective < m_max {
            warn!(
                requested = m_max,
                available = bonds.len(),
                "Requested complexity exceeds the number of rotatable bonds; clamping."
            );
        }

        let atom_count = graph.molecule().len();
        let levels_range: Vec<usize> = (1..=effective).collect();

        #[cfg(feature = "parallel")]
        let iterator = levels_range.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iterator = levels_range.iter();

        let levels: Vec<Vec<RotationGroup>> = iterator
            .map(|&m| enumerate_level(&bonds, m, atom_count))
            .collect();

        for (m, groups) in levels.iter().enumerate() {
            debug!(level = m + 1, groups = groups.len(), "Enumerated rotation groups.");
        }

        Self { bonds, levels }
    }

    /// All rotatable bonds in catalogue order.
    pub fn bonds(&self) -> &[RotatableBond] {
        &self.bonds
    }

    /// The highest level available.
    pub fn max_level(&self) -> usize {
        self.levels.len()
    }

    /// Ranked groups for level `m`; empty for levels outside `1..=max_level`.
    pub fn groups(&self, m: usize) -> &[RotationGroup] {
        m.checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn enumerate_level(bonds: &[RotatableBond], m: usize, atom_count: usize) -> Vec<RotationGroup> {
    // Atoms with identical fragment memberships over the selected bonds form one
    // rigid region, and every atom pair drawn from two regions has the same cut set.
    let mut regions: BTreeMap<Vec<Option<FragmentSide>>, usize> = BTreeMap::new();
    for atom in 0..atom_count {
        let signature: Vec<Option<FragmentSide>> =
            bonds[..m].iter().map(|bond| bond.side_of(atom)).collect();
        regions.entry(signature).or_insert(atom);
    }

    let mut cuts: BTreeMap<Vec<usize>, (usize, usize)> = BTreeMap::new();
    for ((sig_a, atom_a), (sig_b, atom_b)) in regions.iter().tuple_combinations() {
        let cut: Vec<usize> = (0..m)
            .filter(|&k| matches!((sig_a[k], sig_b[k]), (Some(x), Some(y)) if x != y))
            .collect();
        if !cut.is_empty() {
            cuts.entry(cut).or_insert((*atom_a, *atom_b));
        }
    }

    let mut groups: Vec<RotationGroup> = cuts
        .into_iter()
        .filter_map(|(cut, (i, j))| RotationGroup::from_cut(bonds, &cut, i, j))
        .collect();

    groups.sort_by(|a, b| {
        a.len()
            .cmp(&b.len())
            .then(b.score.total_cmp(&a.score))
            .then_with(|| a.name.cmp(&b.name))
    });
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::tests::molecule_from_bonds;

    fn group_names(catalogue: &TorsionCatalogue, m: usize) -> Vec<String> {
        catalogue.groups(m).iter().map(|g| g.name.clone()).collect()
    }

    #[test]
    fn single_bond_produces_single_group() {
        let molecule = molecule_from_bonds(4, &[(1, 2), (2, 3), (3, 4)]);
        let graph = MoleculeGraph::build(&molecule);
        let catalogue = TorsionCatalogue::build(&graph, 1);

        assert_eq!(catalogue.max_level(), 1);
        assert_eq!(group_names(&catalogue, 1), vec!["2_3"]);
    }

    #[test]
    fn requested_level_is_clamped_to_available_bonds() {
        let molecule = molecule_from_bonds(4, &[(1, 2), (2, 3), (3, 4)]);
        let graph = MoleculeGraph::build(&molecule);
        let catalogue = TorsionCatalogue::build(&graph, 5);

        assert_eq!(catalogue.max_level(), 1);
        assert!(catalogue.groups(2).is_empty());
        assert!(catalogue.groups(0).is_empty());
    }

    #[test]
    fn chain_levels_are_ranked_by_size_then_score() {
        // Rotatable bonds in rank order: 3_4, 2_3, 4_5.
        let molecule = molecule_from_bonds(6, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]);
        let graph = MoleculeGraph::build(&molecule);
        let catalogue = TorsionCatalogue::build(&graph, 3);

        assert_eq!(catalogue.max_level(), 3);
        assert_eq!(group_names(&catalogue, 1), vec!["3_4"]);
        assert_eq!(group_names(&catalogue, 2), vec!["3_4", "2_3", "2_3,3_4"]);
        assert_eq!(
            group_names(&catalogue, 3),
            vec!["3_4", "2_3", "4_5", "2_3,3_4", "3_4,4_5", "2_3,3_4,4_5"]
        );
    }

    #[test]
    fn group_sides_are_disjoint_and_oriented_by_metric_bond() {
        let molecule = molecule_from_bonds(6, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]);
        let graph = MoleculeGraph::build(&molecule);
        let catalogue = TorsionCatalogue::build(&graph, 3);

        for group in catalogue.groups(3) {
            assert!(group.side_0.iter().all(|a| !group.side_1.contains(a)));
            let metric = &catalogue.bonds()[group.members[0].bond_index];
            assert!(group
                .side_0
                .iter()
                .all(|&a| metric.side_of(a) == Some(FragmentSide::Zero)));
        }
    }

    #[test]
    fn molecule_without_rotatable_bonds_has_no_levels() {
        let molecule = molecule_from_bonds(3, &[(1, 2), (2, 3)]);
        let graph = MoleculeGraph::build(&molecule);
        let catalogue = TorsionCatalogue::build(&graph, 2);

        assert_eq!(catalogue.max_level(), 0);
        assert!(catalogue.bonds().is_empty());
    }
}
