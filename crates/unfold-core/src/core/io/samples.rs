use crate::core::energy::sample::Sample;
use crate::core::torsion::variables::Variable;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const ENERGY_COLUMN: &str = "energy";
const OCCURRENCE_COLUMNS: [&str; 2] = ["num_occurrences", "occurrences"];

#[derive(Debug, Error)]
pub enum SampleReadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Sample table has no 'energy' column")]
    MissingEnergyColumn,
    #[error("Invalid value on row {row}, column '{column}': '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// Reads a solver sample table.
///
/// The header names one column per variable (`x_1_3`, `aux_2`, ...), an `energy`
/// column, and optionally a `num_occurrences` column. Every row is one sample
/// with 0/1 variable values. Other columns are ignored.
pub fn read_samples<R: io::Read>(reader: R) -> Result<Vec<Sample>, SampleReadError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut energy_idx = None;
    let mut occurrence_idx = None;
    let mut variable_columns: Vec<(usize, Variable)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if header == ENERGY_COLUMN {
            energy_idx = Some(idx);
        } else if OCCURRENCE_COLUMNS.contains(&header) {
            occurrence_idx = Some(idx);
        } else if let Ok(variable) = header.parse::<Variable>() {
            variable_columns.push((idx, variable));
        } else {
            debug!(column = header, "Ignoring unrecognised sample column.");
        }
    }
    let energy_idx = energy_idx.ok_or(SampleReadError::MissingEnergyColumn)?;

    let invalid = |row: usize, idx: usize, value: &str| SampleReadError::InvalidValue {
        row,
        column: headers.get(idx).unwrap_or_default().to_string(),
        value: value.to_string(),
    };

    let mut samples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let row = row + 1;

        let energy_str = record.get(energy_idx).unwrap_or_default();
        let energy: f64 = energy_str
            .parse()
            .map_err(|_| invalid(row, energy_idx, energy_str))?;

        let occurrences = match occurrence_idx {
            Some(idx) => {
                let value = record.get(idx).unwrap_or_default();
                value.parse().map_err(|_| invalid(row, idx, value))?
            }
            None => 1,
        };

        let mut active = Vec::new();
        for &(idx, variable) in &variable_columns {
            match record.get(idx).unwrap_or_default() {
                "1" => active.push(variable),
                "0" => {}
                other => return Err(invalid(row, idx, other)),
            }
        }

        samples.push(Sample::new(energy, active).with_occurrences(occurrences));
    }

    debug!(count = samples.len(), "Read solver samples.");
    Ok(samples)
}

pub fn read_samples_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>, SampleReadError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_samples(io::BufReader::new(file))
}
