use crate::download::DownloadError;
use crate::encoder::EncoderError;
use crate::metadata::MetadataError;
use crate::pairs::PairError;

/// Errors that can occur while building or running the pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Metadata conversion or split failed
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Pair generation failed
    #[error("Pair generation error: {0}")]
    Pairs(#[from] PairError),

    /// Peak download could not run
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Encoder construction or feature export failed
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    /// A step delegated to an external runner failed
    #[error("External step {task} failed: {message}")]
    External {
        /// Name of the task
        task: String,
        /// Failure description
        message: String,
    },

    /// The task graph is inconsistent
    #[error("Invalid task graph: {0}")]
    Graph(String),

    /// The schedule settings are unusable
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Report serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Whether running the task again may succeed.
    ///
    /// Configuration errors fail the task on the first attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            PipelineError::Metadata(MetadataError::InvalidSplit(_))
                | PipelineError::Pairs(PairError::InvalidTolerance(_))
                | PipelineError::Encoder(EncoderError::InvalidConfig(_))
                | PipelineError::Graph(_)
                | PipelineError::InvalidSchedule(_)
        )
    }
}
