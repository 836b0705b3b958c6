use phf::{Map, phf_map};

/// Van der Waals radius (Å) used for elements missing from [`VDW_RADII`].
pub const DEFAULT_VDW_RADIUS: f64 = 1.70;

/// Bondi van der Waals radii in Ångström, keyed by capitalised element symbol.
pub static VDW_RADII: Map<&'static str, f64> = phf_map! {
    // --- Period 1 ---
    "H" => 1.20, "He" => 1.40,

    // --- Period 2 ---
    "Li" => 1.82, "B" => 1.92, "C" => 1.70, "N" => 1.55, "O" => 1.52, "F" => 1.47, "Ne" => 1.54,

    // --- Period 3 ---
    "Na" => 2.27, "Mg" => 1.73, "Al" => 1.84, "Si" => 2.10, "P" => 1.80, "S" => 1.80, "Cl" => 1.75,
    "Ar" => 1.88,

    // --- Period 4 ---
    "K" => 2.75, "Ca" => 2.31, "Ni" => 1.63, "Cu" => 1.40, "Zn" => 1.39, "Ga" => 1.87,
    "Ge" => 2.11, "As" => 1.85, "Se" => 1.90, "Br" => 1.85, "Kr" => 2.02,

    // --- Period 5 ---
    "Pd" => 1.63, "Ag" => 1.72, "Cd" => 1.58, "In" => 1.93, "Sn" => 2.17, "Sb" => 2.06,
    "Te" => 2.06, "I" => 1.98, "Xe" => 2.16,

    // --- Period 6 ---
    "Pt" => 1.75, "Au" => 1.66, "Hg" => 1.55, "Tl" => 1.96, "Pb" => 2.02,
};

/// Returns the van der Waals radius for an element symbol, falling back to
/// [`DEFAULT_VDW_RADIUS`] for unknown symbols.
pub fn vdw_radius(symbol: &str) -> f64 {
    VDW_RADII
        .get(normalize_symbol(symbol).as_str())
        .copied()
        .unwrap_or(DEFAULT_VDW_RADIUS)
}

/// Extracts the element symbol from a SYBYL atom type (`"C.ar"` -> `"C"`, `"Cl"` -> `"Cl"`).
pub fn element_from_atom_type(atom_type: &str) -> String {
    let base = atom_type.split('.').next().unwrap_or(atom_type);
    normalize_symbol(base)
}

fn normalize_symbol(symbol: &str) -> String {
    let mut chars = symbol.trim().chars().filter(|c| c.is_ascii_alphabetic());
    match chars.next() {
        Some(first) => {
            let mut normalized = first.to_ascii_uppercase().to_string();
            normalized.extend(chars.map(|c| c.to_ascii_lowercase()));
            normalized
        }
        None => String::new(),
    }
}
