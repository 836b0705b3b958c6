use crate::core::models::conformation::Conformation;
use crate::core::models::molecule::Molecule;
use crate::engine::error::EngineError;
use std::collections::HashSet;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pairs whose separation moved by less than this are considered untouched.
const MOVED_TOLERANCE: f64 = 1e-6;

/// Two non-bonded atoms that ended up closer than their contact distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Clash {
    pub atom_a: usize,
    pub atom_b: usize,
    pub distance: f64,
    pub threshold: f64,
}

/// Finds steric clashes introduced by moving from `initial` to `candidate`.
///
/// Only pairs of atoms that are not directly bonded and whose distance changed
/// are checked; such a pair clashes when it is closer than
/// `scale * (r_a + r_b)`. Clashes are returned ordered by atom serials.
#[instrument(skip_all, name = "clash_detection_task")]
pub fn run(
    molecule: &Molecule,
    initial: &Conformation,
    candidate: &Conformation,
    scale: f64,
) -> Result<Vec<Clash>, EngineError> {
    let n = molecule.len();
    if initial.len() != n || candidate.len() != n {
        return Err(EngineError::Internal(format!(
            "conformation sizes ({} and {}) do not match the molecule ({} atoms)",
            initial.len(),
            candidate.len(),
            n
        )));
    }

    let bonded: HashSet<(usize, usize)> = molecule
        .bonds()
        .iter()
        .filter_map(|bond| {
            let i = molecule.index_of(bond.atom1)?;
            let j = molecule.index_of(bond.atom2)?;
            Some((i.min(j), i.max(j)))
        })
        .collect();

    let atoms = molecule.atoms();

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..n;

    #[cfg(feature = "parallel")]
    let iterator = (0..n).into_par_iter();

    let clashes: Vec<Clash> = iterator
        .flat_map(|i| {
            (i + 1..n)
                .filter_map(|j| {
                    if bonded.contains(&(i, j)) {
                        return None;
                    }
                    let before = (initial[i] - initial[j]).norm();
                    let after = (candidate[i] - candidate[j]).norm();
                    if (after - before).abs() <= MOVED_TOLERANCE {
                        return None;
                    }
                    let threshold = scale * (atoms[i].vdw_radius + atoms[j].vdw_radius);
                    (after < threshold).then(|| Clash {
                        atom_a: atoms[i].serial,
                        atom_b: atoms[j].serial,
                        distance: after,
                        threshold,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();

    debug!(clashes = clashes.len(), scale, "Clash check complete.");
    Ok(clashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{Bond, BondOrder};
    use nalgebra::Point3;

    fn triatomic() -> Molecule {
        let atoms = vec![
            Atom::new(1, "C1", "C", Point3::new(0.0, 0.0, 0.0)),
            Atom::new(2, "C2", "C", Point3::new(1.5, 0.0, 0.0)),
            Atom::new(3, "C3", "C", Point3::new(10.0, 0.0, 0.0)),
        ];
        let bonds = vec![Bond::new(1, 2, BondOrder::Single)];
        Molecule::new("tri", atoms, bonds).unwrap()
    }

    #[test]
    fn unchanged_geometry_never_clashes() {
        let molecule = triatomic();
        let conf = molecule.conformation();
        assert!(run(&molecule, &conf, &conf, 1.0).unwrap().is_empty());
    }

    #[test]
    fn bonded_pairs_are_ignored_even_when_close() {
        let molecule = triatomic();
        let initial = molecule.conformation();
        let mut candidate = initial.clone();
        candidate[1] = Point3::new(0.5, 0.0, 0.0);
        assert!(run(&molecule, &initial, &candidate, 1.0).unwrap().is_empty());
    }

    #[test]
    fn moved_non_bonded_pair_closer_than_contact_distance_clashes() {
        let molecule = triatomic();
        let initial = molecule.conformation();
        let mut candidate = initial.clone();
        candidate[2] = Point3::new(2.0, 0.0, 0.0);

        let clashes = run(&molecule, &initial, &candidate, 1.0).unwrap();

        // C3 moved next to both C1 (2.0 Å) and C2 (0.5 Å); carbon radii sum to 3.4 Å.
        assert_eq!(clashes.len(), 2);
        assert_eq!((clashes[0].atom_a, clashes[0].atom_b), (1, 3));
        assert_eq!((clashes[1].atom_a, clashes[1].atom_b), (2, 3));
        assert!((clashes[1].distance - 0.5).abs() < 1e-12);
        assert!((clashes[1].threshold - 3.4).abs() < 1e-9);
    }

    #[test]
    fn scale_relaxes_the_contact_distance() {
        let molecule = triatomic();
        let initial = molecule.conformation();
        let mut candidate = initial.clone();
        candidate[2] = Point3::new(4.0, 0.0, 0.0);

        assert_eq!(run(&molecule, &initial, &candidate, 1.0).unwrap().len(), 1);
        assert!(run(&molecule, &initial, &candidate, 0.5).unwrap().is_empty());
    }

    #[test]
    fn mismatched_conformation_is_rejected() {
        let molecule = triatomic();
        let initial = molecule.conformation();
        let short = Conformation::new(vec![Point3::origin()]);
        assert!(run(&molecule, &initial, &short, 1.0).is_err());
    }
}
