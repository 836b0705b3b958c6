use super::element;
use nalgebra::Point3;

/// Represents an atom of a small molecule or biopolymer fragment.
///
/// Atoms are immutable once parsed. Conformational changes never touch the
/// atom itself; they are expressed as a separate [`Conformation`] derived from
/// the original positions.
///
/// [`Conformation`]: super::conformation::Conformation
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The 1-based serial number of the atom as it appears in the source file.
    pub serial: usize,
    /// The name of the atom (e.g., "C1", "N3", "H12").
    pub name: String,
    /// The element symbol (e.g., "C", "N", "Cl").
    pub element: String,
    /// The SYBYL atom type (e.g., "C.3", "N.ar"); equal to the element when unknown.
    pub atom_type: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The van der Waals radius in Angstroms, used for clash detection.
    pub vdw_radius: f64,
}

impl Atom {
    /// Creates a new `Atom`, deriving the van der Waals radius from the element.
    ///
    /// # Arguments
    ///
    /// * `serial` - The 1-based serial number of the atom.
    /// * `name` - The name of the atom.
    /// * `element` - The element symbol.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(serial: usize, name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.to_string(),
            element: element.to_string(),
            atom_type: element.to_string(),
            position,
            vdw_radius: element::vdw_radius(element),
        }
    }

    /// Sets the SYBYL atom type.
    pub fn with_atom_type(mut self, atom_type: &str) -> Self {
        self.atom_type = atom_type.to_string();
        self
    }

    /// Overrides the van der Waals radius derived from the element table.
    pub fn with_vdw_radius(mut self, radius: f64) -> Self {
        self.vdw_radius = radius;
        self
    }
}
