use crate::metadata::MetadataError;

/// Errors that can occur while downloading peak files
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Local file system error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The list of files to download could not be read
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// The download worker pool could not be created
    #[error("Failed to build download pool: {0}")]
    ThreadPool(String),

    /// The transport reported a failed fetch
    #[error("Fetching {url} failed: {message}")]
    Transport {
        /// Remote URL
        url: String,
        /// Failure description
        message: String,
    },
}
