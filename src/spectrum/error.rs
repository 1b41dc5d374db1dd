/// Errors that can occur while reading or building spectra
#[derive(Debug, thiserror::Error)]
pub enum SpectrumError {
    /// I/O error reading a spectrum file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// An MGF entry that does not describe a usable spectrum
    #[error("Invalid spectrum '{identifier}': {message}")]
    InvalidSpectrum {
        /// Spectrum title or `index=<n>`
        identifier: String,
        /// What went wrong
        message: String,
    },

    /// Peak arrays of different lengths
    #[error("Peak arrays differ in length ({mz} m/z values, {intensity} intensities)")]
    PeakLengthMismatch {
        /// Number of m/z values
        mz: usize,
        /// Number of intensity values
        intensity: usize,
    },
}
