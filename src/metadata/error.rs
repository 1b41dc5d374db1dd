/// Errors that can occur during metadata processing
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// I/O error reading or writing a metadata file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Missing required column in the input file
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Invalid train/validation/test split settings
    #[error("Invalid split configuration: {0}")]
    InvalidSplit(String),
}
