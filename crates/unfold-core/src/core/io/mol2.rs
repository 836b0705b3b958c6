use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element;
use crate::core::models::molecule::{Molecule, MoleculeError};
use crate::core::models::topology::{Bond, BondOrder};
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Per-atom MOL2 columns that the molecule model does not carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mol2AtomIoData {
    pub substructure_id: Option<String>,
    pub substructure_name: Option<String>,
    pub charge: Option<String>,
}

/// Everything outside atoms and bonds that a MOL2 round trip must preserve.
#[derive(Debug, Clone, PartialEq)]
pub struct Mol2Metadata {
    pub molecule_type: String,
    pub charge_type: String,
    pub atom_io_data: HashMap<usize, Mol2AtomIoData>,
    /// Sections other than MOLECULE/ATOM/BOND, verbatim, in file order.
    pub extra_sections: Vec<(String, Vec<String>)>,
}

impl Default for Mol2Metadata {
    fn default() -> Self {
        Self {
            molecule_type: "SMALL".to_string(),
            charge_type: "NO_CHARGES".to_string(),
            atom_io_data: HashMap::new(),
            extra_sections: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Mol2Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: Mol2ParseErrorKind },
    #[error("Missing required section: @<TRIPOS>{0}")]
    MissingSection(&'static str),
    #[error("Invalid molecule: {0}")]
    Molecule(#[from] MoleculeError),
}

#[derive(Debug, Error)]
pub enum Mol2ParseErrorKind {
    #[error("{record} record needs at least {expected} fields, found {found}")]
    TooFewFields {
        record: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Invalid integer in field '{field}' (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Unknown bond type '{0}'")]
    InvalidBondOrder(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Molecule,
    Atom,
    Bond,
    Other,
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
    float: bool,
) -> Result<T, Mol2Error> {
    value.parse().map_err(|_| Mol2Error::Parse {
        line,
        kind: if float {
            Mol2ParseErrorKind::InvalidFloat {
                field,
                value: value.into(),
            }
        } else {
            Mol2ParseErrorKind::InvalidInt {
                field,
                value: value.into(),
            }
        },
    })
}

fn require_fields(
    parts: &[&str],
    record: &'static str,
    expected: usize,
    line: usize,
) -> Result<(), Mol2Error> {
    if parts.len() < expected {
        return Err(Mol2Error::Parse {
            line,
            kind: Mol2ParseErrorKind::TooFewFields {
                record,
                expected,
                found: parts.len(),
            },
        });
    }
    Ok(())
}

/// Tripos MOL2 reader and writer for a single molecule.
///
/// Only the first `@<TRIPOS>MOLECULE` block is read. Atom elements are derived
/// from the SYBYL atom type and van der Waals radii from the element table.
pub struct Mol2File;

impl MolecularFile for Mol2File {
    type Metadata = Mol2Metadata;
    type Error = Mol2Error;

    fn read_from(reader: &mut impl BufRead) -> Result<(Molecule, Self::Metadata), Self::Error> {
        let mut metadata = Mol2Metadata::default();
        let mut name: Option<String> = None;
        let mut molecule_line = 0usize;
        let mut atoms = Vec::new();
        let mut bonds = Vec::new();
        let mut section = Section::Preamble;
        let mut seen_molecule = false;
        let mut seen_atoms = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let raw = line_res?;
            let line_num = line_num + 1;
            let line = raw.trim();

            if let Some(header) = line.strip_prefix("@<TRIPOS>") {
                if header == "MOLECULE" && seen_molecule {
                    break;
                }
                section = match header {
                    "MOLECULE" => {
                        seen_molecule = true;
                        molecule_line = 0;
                        Section::Molecule
                    }
                    "ATOM" => {
                        seen_atoms = true;
                        Section::Atom
                    }
                    "BOND" => Section::Bond,
                    other => {
                        metadata
                            .extra_sections
                            .push((other.to_string(), Vec::new()));
                        Section::Other
                    }
                };
                continue;
            }

            match section {
                Section::Preamble => {}
                Section::Other => {
                    if let Some((_, lines)) = metadata.extra_sections.last_mut() {
                        lines.push(raw);
                    }
                }
                Section::Molecule => {
                    molecule_line += 1;
                    match molecule_line {
                        1 => name = Some(line.to_string()),
                        3 if !line.is_empty() => metadata.molecule_type = line.to_string(),
                        4 if !line.is_empty() => metadata.charge_type = line.to_string(),
                        _ => {}
                    }
                }
                Section::Atom => {
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    require_fields(&parts, "ATOM", 6, line_num)?;

                    let serial: usize = parse_field(parts[0], "atom_id", line_num, false)?;
                    let x: f64 = parse_field(parts[2], "x", line_num, true)?;
                    let y: f64 = parse_field(parts[3], "y", line_num, true)?;
                    let z: f64 = parse_field(parts[4], "z", line_num, true)?;
                    let atom_type = parts[5];
                    let element = element::element_from_atom_type(atom_type);

                    atoms.push(
                        Atom::new(serial, parts[1], &element, Point3::new(x, y, z))
                            .with_atom_type(atom_type),
                    );
                    metadata.atom_io_data.insert(
                        serial,
                        Mol2AtomIoData {
                            substructure_id: parts.get(6).map(|s| s.to_string()),
                            substructure_name: parts.get(7).map(|s| s.to_string()),
                            charge: parts.get(8).map(|s| s.to_string()),
                        },
                    );
                }
                Section::Bond => {
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    require_fields(&parts, "BOND", 4, line_num)?;

                    let origin: usize = parse_field(parts[1], "origin_atom_id", line_num, false)?;
                    let target: usize = parse_field(parts[2], "target_atom_id", line_num, false)?;
                    let order: BondOrder = parts[3].parse().map_err(|_| Mol2Error::Parse {
                        line: line_num,
                        kind: Mol2ParseErrorKind::InvalidBondOrder(parts[3].to_string()),
                    })?;
                    bonds.push(Bond::new(origin, target, order));
                }
            }
        }

        if !seen_molecule {
            return Err(Mol2Error::MissingSection("MOLECULE"));
        }
        if !seen_atoms {
            return Err(Mol2Error::MissingSection("ATOM"));
        }

        let molecule = Molecule::new(name.as_deref().unwrap_or(""), atoms, bonds)?;
        Ok((molecule, metadata))
    }

    fn write_to(
        molecule: &Molecule,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "@<TRIPOS>MOLECULE")?;
        writeln!(writer, "{}", molecule.name())?;
        writeln!(
            writer,
            "{:>5} {:>5} {:>5} {:>5} {:>5}",
            molecule.len(),
            molecule.bonds().len(),
            1,
            0,
            0
        )?;
        writeln!(writer, "{}", metadata.molecule_type)?;
        writeln!(writer, "{}", metadata.charge_type)?;
        writeln!(writer)?;

        writeln!(writer, "@<TRIPOS>ATOM")?;
        for atom in molecule.atoms() {
            let io = metadata.atom_io_data.get(&atom.serial);
            let substructure_id = io
                .and_then(|d| d.substructure_id.as_deref())
                .unwrap_or("1");
            let substructure_name = io
                .and_then(|d| d.substructure_name.as_deref())
                .unwrap_or("MOL");
            let charge = io.and_then(|d| d.charge.as_deref()).unwrap_or("0.0000");
            writeln!(
                writer,
                "{:>7} {:<8} {:>10.4} {:>10.4} {:>10.4} {:<8} {:>5} {:<8} {:>10}",
                atom.serial,
                atom.name,
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.atom_type,
                substructure_id,
                substructure_name,
                charge
            )?;
        }

        writeln!(writer, "@<TRIPOS>BOND")?;
        for (i, bond) in molecule.bonds().iter().enumerate() {
            writeln!(
                writer,
                "{:>6} {:>6} {:>6} {:>3}",
                i + 1,
                bond.atom1,
                bond.atom2,
                bond.order.to_mol2()
            )?;
        }

        for (header, lines) in &metadata.extra_sections {
            writeln!(writer, "@<TRIPOS>{}", header)?;
            for line in lines {
                writeln!(writer, "{}", line)?;
            }
        }
        Ok(())
    }
}
