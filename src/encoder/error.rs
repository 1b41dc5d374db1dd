use crate::spectrum::SpectrumError;

/// Errors that can occur while building encoders or exporting features
#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    /// Inconsistent encoder settings
    #[error("Invalid encoder configuration: {0}")]
    InvalidConfig(String),

    /// The reference spectra file holds fewer spectra than requested
    #[error("Insufficient number of reference spectra ({available} available, {required} required)")]
    InsufficientReferenceSpectra {
        /// Spectra found in the reference file
        available: usize,
        /// Spectra requested by the configuration
        required: usize,
    },

    /// Reading spectra failed
    #[error("Spectrum error: {0}")]
    Spectrum(#[from] SpectrumError),

    /// I/O error writing a feature table
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV error writing a feature table
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}
