use crate::core::graph::{FragmentSide, RotatableBond};
use serde::{Deserialize, Serialize};

/// One rotatable bond participating in a [`RotationGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// Name of the rotatable bond.
    pub bond: String,
    /// Position of the bond in the rotatable-bond catalogue (0-based).
    pub bond_index: usize,
    /// The bond fragment that contains the group's side-1 and is rotated.
    pub moving: FragmentSide,
}

/// A set of rotatable bonds that together separate two atom sets.
///
/// Rotating every member's moving fragment about its bond displaces `side_1`
/// rigidly relative to `side_0`; the distance between the two sides' centroids
/// is what the energy model rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationGroup {
    /// Comma-joined, lexicographically sorted member bond names.
    pub name: String,
    /// Members in catalogue order. The first member fixes the group orientation.
    pub members: Vec<GroupMember>,
    /// Dense indices of the atoms that stay fixed.
    pub side_0: Vec<usize>,
    /// Dense indices of the atoms that move.
    pub side_1: Vec<usize>,
    /// Mean score of the member bonds.
    pub score: f64,
}

impl RotationGroup {
    /// Derives a group from a cut set of bonds and one atom on each side of the cut.
    ///
    /// `bond_indices` must be sorted and non-empty, and every member bond must
    /// place `atom_i` and `atom_j` in opposite fragments.
    pub(crate) fn from_cut(
        bonds: &[RotatableBond],
        bond_indices: &[usize],
        atom_i: usize,
        atom_j: usize,
    ) -> Option<Self> {
        let side_a = intersect_fragments(bonds, bond_indices, atom_i)?;
        let side_b = intersect_fragments(bonds, bond_indices, atom_j)?;

        let metric = &bonds[*bond_indices.first()?];
        let (side_0, side_1) = match metric.side_of(*side_a.first()?) {
            Some(FragmentSide::Zero) => (side_a, side_b),
            _ => (side_b, side_a),
        };

        let anchor = *side_1.first()?;
        let members = bond_indices
            .iter()
            .map(|&idx| {
                let bond = &bonds[idx];
                bond.side_of(anchor).map(|moving| GroupMember {
                    bond: bond.name.clone(),
                    bond_index: idx,
                    moving,
                })
            })
            .collect::<Option<Vec<_>>>()?;

        let mut names: Vec<&str> = members.iter().map(|m| m.bond.as_str()).collect();
        names.sort_unstable();
        let score =
            bond_indices.iter().map(|&idx| bonds[idx].score).sum::<f64>() / bond_indices.len() as f64;

        Some(Self {
            name: names.join(","),
            members,
            side_0,
            side_1,
            score,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Intersects, over the given bonds, the fragment that contains `atom`.
fn intersect_fragments(
    bonds: &[RotatableBond],
    bond_indices: &[usize],
    atom: usize,
) -> Option<Vec<usize>> {
    let mut result: Option<Vec<usize>> = None;
    for &idx in bond_indices {
        let bond = &bonds[idx];
        let fragment = bond.fragment(bond.side_of(atom)?);
        result = Some(match result {
            None => fragment.to_vec(),
            Some(current) => intersect_sorted(&current, fragment),
        });
    }
    result.filter(|set| !set.is_empty())
}

fn intersect_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
