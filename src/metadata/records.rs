use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::MetadataError;

/// Columns every metadata CSV must carry.
const METADATA_COLUMNS: [&str; 6] = ["dataset", "filename", "scan", "sequence", "charge", "mz"];

/// One peptide-spectrum match as listed in the raw library TSV.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPsm {
    /// Peptide annotation (becomes `sequence`)
    pub annotation: String,
    /// Precursor charge
    pub charge: u32,
    /// Remote path of the peak file, `{dataset}/.../{basename}`
    pub filename: String,
    /// Precursor m/z
    pub mz: f64,
    /// Scan number within the peak file
    pub scan: i64,
}

/// One row of the metadata CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRow {
    /// Dataset identifier
    pub dataset: String,
    /// Peak file basename
    pub filename: String,
    /// Scan number
    pub scan: i64,
    /// Peptide sequence
    pub sequence: String,
    /// Precursor charge
    pub charge: u32,
    /// Precursor m/z
    pub mz: f64,
    /// 0-based position in the metadata file, assigned on load
    #[serde(skip)]
    pub row_num: usize,
}

/// Read a metadata CSV, numbering rows by file order.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<Vec<MetadataRow>, MetadataError> {
    let path = path.as_ref();
    let rows = read_metadata_from(BufReader::new(File::open(path)?))?;
    debug!("Read {} metadata rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read metadata rows from any CSV source.
pub fn read_metadata_from<R: Read>(reader: R) -> Result<Vec<MetadataRow>, MetadataError> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    for column in METADATA_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(MetadataError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for (row_num, record) in csv_reader.deserialize::<MetadataRow>().enumerate() {
        let mut row = record?;
        row.row_num = row_num;
        rows.push(row);
    }
    Ok(rows)
}

/// Write metadata rows as CSV (header included, `row_num` omitted).
pub fn write_metadata<'a, W, I>(writer: W, rows: I) -> Result<(), MetadataError>
where
    W: Write,
    I: IntoIterator<Item = &'a MetadataRow>,
{
    // Header written up front so an empty partition is still a valid file
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(METADATA_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
