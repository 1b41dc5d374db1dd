use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use specpair::config::Config;
use specpair::encoder::{convert_spectra_to_features, SpectrumEncoder};

/// Encode the spectra of an MGF file into a CSV feature table
pub fn run(
    config: &Config,
    input: PathBuf,
    output: Option<PathBuf>,
    reference_spectra: Option<PathBuf>,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    let output = output.unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        config.paths.feature_dir().join(format!("{}.csv", stem))
    });
    let reference_spectra = reference_spectra.or_else(|| config.paths.reference_spectra.clone());

    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());

    let encoder = config
        .encoder_config()
        .build(reference_spectra.as_deref())
        .context("Failed to build the spectrum encoder")?;
    info!("Encoder produces {} features", encoder.num_features());

    let fragment = &config.encoder.fragment;
    let (outcome, stats) = convert_spectra_to_features(
        &encoder,
        &input,
        &output,
        fragment.min_mz,
        fragment.max_mz,
        &config.preprocess,
    )
    .with_context(|| format!("Failed to encode {}", input.display()))?;

    println!("Feature table {}: {}", outcome, output.display());
    if outcome.is_written() {
        println!(
            "  {} spectra read, {} encoded, {} invalid",
            stats.spectra_read, stats.spectra_encoded, stats.spectra_invalid
        );
    }
    Ok(())
}
