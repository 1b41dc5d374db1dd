use std::io::Write;
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use crate::output::{write_if_absent, StepOutcome};
use crate::spectrum::{mgf, preprocess, PreprocessConfig, Spectrum};

use super::{EncoderError, SpectrumEncoder};

/// Counts from a feature conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Spectra read from the input
    pub spectra_read: usize,
    /// Spectra encoded and written
    pub spectra_encoded: usize,
    /// Spectra dropped by preprocessing
    pub spectra_invalid: usize,
}

/// Write a feature table: header `identifier,<feature names>`, one row per
/// spectrum. Returns the number of rows written.
pub fn write_feature_table<E, W>(
    encoder: &E,
    spectra: &[Spectrum],
    writer: W,
) -> Result<usize, EncoderError>
where
    E: SpectrumEncoder + ?Sized,
    W: Write,
{
    let names = encoder.feature_names();
    if encoder.num_features() != names.len() {
        warn!(
            "Encoder declares {} feature names but produces {} values per spectrum",
            names.len(),
            encoder.num_features()
        );
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);
    csv_writer.write_record(std::iter::once("identifier").chain(names.iter().map(String::as_str)))?;

    let mut record: Vec<String> = Vec::with_capacity(encoder.num_features() + 1);
    for spectrum in spectra {
        record.clear();
        record.push(spectrum.identifier.clone());
        record.extend(encoder.encode(spectrum).iter().map(|v| v.to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(spectra.len())
}

/// Encode every valid spectrum of an MGF file into a CSV feature table.
///
/// Spectra are preprocessed into `[min_mz, max_mz]` first; invalid spectra
/// are left out. Does nothing if `output_path` already exists.
pub fn convert_spectra_to_features<E, P, Q>(
    encoder: &E,
    input_path: P,
    output_path: Q,
    min_mz: f64,
    max_mz: f64,
    preprocess_config: &PreprocessConfig,
) -> Result<(StepOutcome, ExportStats), EncoderError>
where
    E: SpectrumEncoder + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output_path = output_path.as_ref();
    if output_path.is_file() {
        info!("Feature table {} exists, skipping", output_path.display());
        return Ok((StepOutcome::Skipped, ExportStats::default()));
    }

    info!("Encode spectra from {}", input_path.as_ref().display());
    let spectra = mgf::read_mgf_file(input_path)?;
    let spectra_read = spectra.len();
    let valid: Vec<Spectrum> = spectra
        .iter()
        .map(|s| preprocess(s, min_mz, max_mz, preprocess_config))
        .filter(|p| p.is_valid())
        .map(|p| p.into_inner())
        .collect();

    let stats = ExportStats {
        spectra_read,
        spectra_encoded: valid.len(),
        spectra_invalid: spectra_read - valid.len(),
    };
    debug!("Save {} feature vectors to {}", valid.len(), output_path.display());
    let outcome = write_if_absent(output_path, |writer| {
        write_feature_table(encoder, &valid, writer).map(|_| ())
    })?;
    Ok((outcome, stats))
}
