use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};

use crate::output::{write_if_absent, StepOutcome};

use super::records::{write_metadata, MetadataRow, RawPsm};
use super::MetadataError;

/// Columns the raw library TSV must provide.
const RAW_COLUMNS: [&str; 5] = ["annotation", "charge", "filename", "mz", "scan"];

/// Split a remote peak file path into its dataset and basename.
///
/// `"MSV000079514/ccms_peak/RAW/run_01.mzML"` becomes
/// `("MSV000079514", "run_01.mzML")`.
pub fn split_dataset_filename(raw_filename: &str) -> (&str, &str) {
    let dataset = raw_filename.split('/').next().unwrap_or(raw_filename);
    let basename = raw_filename.rsplit('/').next().unwrap_or(raw_filename);
    (dataset, basename)
}

/// Convert the raw library TSV into the metadata CSV.
///
/// Keeps the match columns, renames `annotation` to `sequence`, splits the
/// remote filename into dataset and basename, and sorts by
/// (dataset, filename, scan). Does nothing if `metadata_path` already exists.
pub fn convert_metadata<P, Q>(raw_path: P, metadata_path: Q) -> Result<StepOutcome, MetadataError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let raw_path = raw_path.as_ref();
    let metadata_path = metadata_path.as_ref();
    if metadata_path.is_file() {
        info!("Metadata file {} exists, skipping conversion", metadata_path.display());
        return Ok(StepOutcome::Skipped);
    }

    info!("Convert the library metadata file {}", raw_path.display());
    let mut rows = read_raw_rows(BufReader::new(File::open(raw_path)?))?;
    rows.sort_by(|a, b| {
        a.dataset
            .cmp(&b.dataset)
            .then_with(|| a.filename.cmp(&b.filename))
            .then_with(|| a.scan.cmp(&b.scan))
    });

    debug!("Save {} metadata rows to {}", rows.len(), metadata_path.display());
    write_if_absent(metadata_path, |writer| write_metadata(writer, &rows))
}

fn raw_tsv_reader<R: Read>(reader: R) -> Result<csv::Reader<R>, MetadataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?;
    for column in RAW_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(MetadataError::MissingColumn(column.to_string()));
        }
    }
    Ok(csv_reader)
}

pub(super) fn read_raw_rows<R: Read>(reader: R) -> Result<Vec<MetadataRow>, MetadataError> {
    let mut csv_reader = raw_tsv_reader(reader)?;
    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<RawPsm>() {
        let psm = record?;
        let (dataset, basename) = split_dataset_filename(&psm.filename);
        rows.push(MetadataRow {
            dataset: dataset.to_string(),
            filename: basename.to_string(),
            scan: psm.scan,
            sequence: psm.annotation,
            charge: psm.charge,
            mz: psm.mz,
            row_num: 0,
        });
    }
    for (row_num, row) in rows.iter_mut().enumerate() {
        row.row_num = row_num;
    }
    Ok(rows)
}

/// Distinct remote peak file paths listed in the raw library TSV, in
/// first-seen order.
pub fn read_peak_filenames<P: AsRef<Path>>(raw_path: P) -> Result<Vec<String>, MetadataError> {
    let file = File::open(raw_path.as_ref())?;
    let mut csv_reader = raw_tsv_reader(BufReader::new(file))?;
    let column = csv_reader
        .headers()?
        .iter()
        .position(|h| h.trim() == "filename")
        .ok_or_else(|| MetadataError::MissingColumn("filename".to_string()))?;

    let mut seen = HashSet::new();
    let mut filenames = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if let Some(filename) = record.get(column) {
            if seen.insert(filename.to_string()) {
                filenames.push(filename.to_string());
            }
        }
    }
    Ok(filenames)
}
