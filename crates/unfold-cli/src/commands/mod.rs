pub mod build;
pub mod inspect;
pub mod reconstruct;

use crate::error::{CliError, Result};
use molunfold::core::io::mol2::{Mol2File, Mol2Metadata};
use molunfold::core::io::traits::MolecularFile;
use molunfold::core::models::molecule::Molecule;
use std::path::Path;
use tracing::info;

pub(crate) fn read_molecule(path: &Path) -> Result<(Molecule, Mol2Metadata)> {
    info!("Loading input molecule from {:?}", path);
    Mol2File::read_from_path(path).map_err(|e| CliError::parsing(path, e))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Butane with its terminal carbons on the same side of the central bond.
    pub const FOLDED_BUTANE: &str = "\
@<TRIPOS>MOLECULE
butane
    4     3     1     0     0
SMALL
NO_CHARGES

@<TRIPOS>ATOM
      1 C1          0.0000     1.0000     0.0000 C.3          1 BUT       0.0000
      2 C2          0.0000     0.0000     0.0000 C.3          1 BUT       0.0000
      3 C3          1.5000     0.0000     0.0000 C.3          1 BUT       0.0000
      4 C4          1.5000     1.0000     0.0000 C.3          1 BUT       0.0000
@<TRIPOS>BOND
     1     1     2    1
     2     2     3    1
     3     3     4    1
";

    pub fn write_butane(dir: &Path) -> PathBuf {
        let path = dir.join("butane.mol2");
        fs::write(&path, FOLDED_BUTANE).unwrap();
        path
    }
}
