use anyhow::{Context, Result};
use std::path::PathBuf;

use specpair::config::Config;
use specpair::pairs::{generate_pairs_negative, generate_pairs_positive, pair_paths};

use super::PairKind;

/// Generate pair files for a metadata CSV
pub fn run(
    config: &Config,
    metadata: PathBuf,
    kind: PairKind,
    mz_tolerance: Option<f64>,
) -> Result<()> {
    if !metadata.exists() {
        anyhow::bail!("Metadata file does not exist: {}", metadata.display());
    }
    let (positive, negative) = pair_paths(&metadata);

    if matches!(kind, PairKind::Positive | PairKind::Both) {
        let outcome = generate_pairs_positive(&metadata, &positive)
            .context("Failed to generate positive pairs")?;
        println!("Positive pairs {}: {}", outcome, positive.display());
    }
    if matches!(kind, PairKind::Negative | PairKind::Both) {
        let tolerance = mz_tolerance.unwrap_or(config.pairs.mz_tolerance);
        let outcome = generate_pairs_negative(&metadata, &negative, tolerance)
            .context("Failed to generate negative pairs")?;
        println!("Negative pairs {}: {}", outcome, negative.display());
    }
    Ok(())
}
