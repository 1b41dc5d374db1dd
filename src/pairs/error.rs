use crate::metadata::MetadataError;

/// Errors that can occur during pair generation
#[derive(Debug, thiserror::Error)]
pub enum PairError {
    /// I/O error writing or reading a pair file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed pair file
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// The metadata input could not be read
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Precursor m/z tolerance must be finite and non-negative
    #[error("Invalid precursor m/z tolerance: {0}")]
    InvalidTolerance(f64),
}
