use std::path::Path;
use std::process::{Command, Stdio};

use super::{DownloadConfig, DownloadError};

/// A way to fetch one remote file to a local path.
///
/// Implementations are called concurrently from the download pool.
pub trait Transport: Sync {
    /// Fetch `remote_path` and write it to `destination`.
    fn fetch(&self, remote_path: &str, destination: &Path) -> Result<(), DownloadError>;
}

/// Transport that runs `wget` for every file.
#[derive(Debug, Clone)]
pub struct WgetTransport {
    base_url: String,
    tries: u32,
}

impl WgetTransport {
    /// Create a transport for the given base URL.
    pub fn new(base_url: impl Into<String>, tries: u32) -> Self {
        Self {
            base_url: base_url.into(),
            tries: tries.max(1),
        }
    }

    /// Create a transport from download settings.
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(config.base_url.clone(), config.tries)
    }

    /// Full URL of a remote path.
    pub fn url(&self, remote_path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            remote_path.trim_start_matches('/')
        )
    }
}

impl Transport for WgetTransport {
    fn fetch(&self, remote_path: &str, destination: &Path) -> Result<(), DownloadError> {
        let url = self.url(remote_path);
        let status = Command::new("wget")
            .arg("-q")
            .arg(format!("--tries={}", self.tries))
            .arg("-O")
            .arg(destination)
            .arg(&url)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| DownloadError::Transport {
                url: url.clone(),
                message: format!("could not run wget: {}", e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DownloadError::Transport {
                url,
                message: format!("wget exited with {}", status),
            })
        }
    }
}
