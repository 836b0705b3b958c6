use super::atom::Atom;
use super::conformation::Conformation;
use super::topology::Bond;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Duplicate atom serial: {0}")]
    DuplicateSerial(usize),
    #[error("Bond {atom1}-{atom2} references non-existent atom serial {missing}")]
    DanglingBond {
        atom1: usize,
        atom2: usize,
        missing: usize,
    },
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
}

/// Content hash of a molecule: name, atoms (serial, element, position, radius) and bonds.
///
/// Two molecules with the same fingerprint yield the same energy models. The
/// value is only meaningful within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoleculeFingerprint(u64);

impl fmt::Display for MoleculeFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Represents a complete molecule: an ordered list of atoms and the bonds between them.
///
/// Atoms are addressed in two ways: by their *serial* (the identifier from the
/// source file, usually 1-based) and by their *dense index* (position in
/// [`Molecule::atoms`]). Graph and geometry algorithms work on dense indices;
/// user-facing names (bond names, output files) use serials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    /// The molecule name, as given in the source file.
    name: String,
    /// Atoms in file order.
    atoms: Vec<Atom>,
    /// Bonds in file order, with duplicates removed.
    bonds: Vec<Bond>,
    /// Lookup map from atom serial to dense index.
    index_by_serial: HashMap<usize, usize>,
}

impl Molecule {
    /// Creates a validated molecule.
    ///
    /// Duplicate bonds (in either direction) are dropped; the first declaration wins.
    ///
    /// # Errors
    ///
    /// Returns [`MoleculeError`] if two atoms share a serial, a bond references an
    /// unknown atom, or an atom is bonded to itself.
    pub fn new(name: &str, atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<Self, MoleculeError> {
        let mut index_by_serial = HashMap::with_capacity(atoms.len());
        for (idx, atom) in atoms.iter().enumerate() {
            if index_by_serial.insert(atom.serial, idx).is_some() {
                return Err(MoleculeError::DuplicateSerial(atom.serial));
            }
        }

        let mut unique_bonds: Vec<Bond> = Vec::with_capacity(bonds.len());
        let mut seen_pairs: HashSet<(usize, usize)> = HashSet::with_capacity(bonds.len());
        for bond in bonds {
            if bond.atom1 == bond.atom2 {
                return Err(MoleculeError::SelfBond(bond.atom1));
            }
            for serial in [bond.atom1, bond.atom2] {
                if !index_by_serial.contains_key(&serial) {
                    return Err(MoleculeError::DanglingBond {
                        atom1: bond.atom1,
                        atom2: bond.atom2,
                        missing: serial,
                    });
                }
            }
            if seen_pairs.insert(bond.key()) {
                unique_bonds.push(bond);
            }
        }

        Ok(Self {
            name: name.to_string(),
            atoms,
            bonds: unique_bonds,
            index_by_serial,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all atoms in dense-index order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Returns all bonds in declaration order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Resolves an atom serial to its dense index.
    pub fn index_of(&self, serial: usize) -> Option<usize> {
        self.index_by_serial.get(&serial).copied()
    }

    /// Retrieves an atom by its serial.
    pub fn atom(&self, serial: usize) -> Option<&Atom> {
        self.index_of(serial).map(|idx| &self.atoms[idx])
    }

    pub fn fingerprint(&self) -> MoleculeFingerprint {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        self.atoms.len().hash(&mut hasher);
        for atom in &self.atoms {
            atom.serial.hash(&mut hasher);
            atom.element.hash(&mut hasher);
            for coordinate in atom.position.iter() {
                coordinate.to_bits().hash(&mut hasher);
            }
            atom.vdw_radius.to_bits().hash(&mut hasher);
        }
        self.bonds.hash(&mut hasher);
        MoleculeFingerprint(hasher.finish())
    }

    /// The conformation described by the atoms' original coordinates.
    pub fn conformation(&self) -> Conformation {
        Conformation::new(self.atoms.iter().map(|a| a.position).collect())
    }

    /// Returns a copy of this molecule with positions taken from `conformation`.
    ///
    /// Atoms beyond the length of the conformation keep their original positions.
    pub fn with_conformation(&self, conformation: &Conformation) -> Self {
        let mut molecule = self.clone();
        for (atom, position) in molecule.atoms.iter_mut().zip(conformation.iter()) {
            atom.position = *position;
        }
        molecule
    }
}
