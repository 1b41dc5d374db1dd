//! Write-once output files.
//!
//! Every pipeline step that produces a file treats an existing output as a
//! completed step. Outputs are written to a temporary file in the destination
//! directory and renamed into place only after the writer finished, so an
//! interrupted step never leaves a truncated file behind that a later run
//! would mistake for a complete one.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use tempfile::NamedTempFile;

/// Result of an idempotent pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The output did not exist and was written.
    Written,
    /// The output already existed and was left untouched.
    Skipped,
}

impl StepOutcome {
    /// Whether the step produced a new output.
    pub fn is_written(self) -> bool {
        matches!(self, StepOutcome::Written)
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::Written => write!(f, "written"),
            StepOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Run `write` against `path` unless the file already exists.
pub fn write_if_absent<P, F, E>(path: P, write: F) -> Result<StepOutcome, E>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), E>,
    E: From<io::Error>,
{
    let path = path.as_ref();
    if path.is_file() {
        info!("Output {} already exists, skipping", path.display());
        return Ok(StepOutcome::Skipped);
    }
    write_atomic(path, write)?;
    Ok(StepOutcome::Written)
}

/// Write `path` through a temporary sibling file and rename it into place.
pub fn write_atomic<P, F, E>(path: P, write: F) -> Result<(), E>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), E>,
    E: From<io::Error>,
{
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    debug!("Wrote {}", path.display());
    Ok(())
}
