//! # Peak File Download
//!
//! Fetches the peak files referenced by the raw library metadata from the
//! remote repository into `{peak_dir}/{dataset}/{basename}`.
//!
//! Downloads run in parallel on a dedicated rayon pool, one task per distinct
//! file. Files that are already present are skipped, and a failed download
//! only costs that one file: it is logged, leaves nothing behind at its target
//! path, and is attempted again on the next run.
//!
//! The network fetch itself sits behind the [`Transport`] trait; the default
//! [`WgetTransport`] shells out to `wget` and relies on its retry policy.

mod error;
mod transport;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metadata::{read_peak_filenames, split_dataset_filename};

pub use error::DownloadError;
pub use transport::{Transport, WgetTransport};

/// Settings for peak file downloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Base URL the remote file paths are appended to
    pub base_url: String,
    /// Number of parallel downloads (defaults to available parallelism)
    pub workers: Option<usize>,
    /// Attempts per file, passed on to the transport
    pub tries: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: "ftp://massive.ucsd.edu/".to_string(),
            workers: None,
            tries: 3,
        }
    }
}

impl DownloadConfig {
    /// Worker count to use for the download pool.
    pub fn num_workers(&self) -> usize {
        self.workers.filter(|&n| n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        })
    }
}

/// Outcome counts of a download batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadStats {
    /// Distinct files requested
    pub requested: usize,
    /// Files fetched in this run
    pub downloaded: usize,
    /// Files already present
    pub skipped: usize,
    /// Files whose download failed
    pub failed: usize,
}

impl std::fmt::Display for DownloadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} requested, {} downloaded, {} already present, {} failed",
            self.requested, self.downloaded, self.skipped, self.failed
        )
    }
}

/// Local path for a remote peak file: `{peak_dir}/{dataset}/{basename}`.
pub fn local_peak_path<P: AsRef<Path>>(peak_dir: P, remote_path: &str) -> PathBuf {
    let (dataset, basename) = split_dataset_filename(remote_path);
    peak_dir.as_ref().join(dataset).join(basename)
}

fn part_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

/// Download every peak file listed in the raw library TSV.
pub fn download_library_peaks<P, Q, T>(
    raw_path: P,
    peak_dir: Q,
    config: &DownloadConfig,
    transport: &T,
) -> Result<DownloadStats, DownloadError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    T: Transport + ?Sized,
{
    let filenames = read_peak_filenames(raw_path)?;
    download_peaks(&filenames, peak_dir, config, transport)
}

/// Download the given remote peak files that are not present locally yet.
///
/// Individual failures are logged and counted; only a failure to set up the
/// worker pool is returned as an error.
pub fn download_peaks<Q, T>(
    remote_paths: &[String],
    peak_dir: Q,
    config: &DownloadConfig,
    transport: &T,
) -> Result<DownloadStats, DownloadError>
where
    Q: AsRef<Path>,
    T: Transport + ?Sized,
{
    let peak_dir = peak_dir.as_ref();
    let workers = config.num_workers();
    info!(
        "Download {} peak files to {} using {} workers",
        remote_paths.len(),
        peak_dir.display(),
        workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| DownloadError::ThreadPool(e.to_string()))?;

    let downloaded = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    pool.install(|| {
        remote_paths.par_iter().for_each(|remote_path| {
            let target = local_peak_path(peak_dir, remote_path);
            if target.is_file() {
                skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            match fetch_one(remote_path, &target, transport) {
                Ok(()) => {
                    downloaded.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    warn!("Failed to download {}: {}", remote_path, e);
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        });
    });

    let stats = DownloadStats {
        requested: remote_paths.len(),
        downloaded: downloaded.into_inner(),
        skipped: skipped.into_inner(),
        failed: failed.into_inner(),
    };
    info!("Peak download finished: {}", stats);
    Ok(stats)
}

fn fetch_one<T: Transport + ?Sized>(remote_path: &str, target: &Path, transport: &T) -> Result<(), DownloadError> {
    if let Some(dataset_dir) = target.parent() {
        fs::create_dir_all(dataset_dir)?;
    }
    let part = part_path(target);
    debug!("Download file {}", remote_path);
    match transport.fetch(remote_path, &part) {
        Ok(()) => {
            fs::rename(&part, target)?;
            Ok(())
        }
        Err(e) => {
            // A partial file must not look like a finished download
            let _ = fs::remove_file(&part);
            Err(e)
        }
    }
}
