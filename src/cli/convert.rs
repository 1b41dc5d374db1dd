use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use specpair::config::Config;
use specpair::metadata::convert_metadata;

/// Convert the raw library TSV to the metadata CSV
pub fn run(config: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input = input.unwrap_or_else(|| config.paths.raw_metadata_path());
    let output = output.unwrap_or_else(|| config.paths.metadata_path());

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());

    let outcome = convert_metadata(&input, &output)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!("Metadata {}: {}", outcome, output.display());
    Ok(())
}
