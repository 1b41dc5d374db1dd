use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use specpair::config::Config;
use specpair::download::{download_library_peaks, WgetTransport};

/// Download the peak files referenced by the raw library TSV
pub fn run(
    config: &Config,
    input: Option<PathBuf>,
    peak_dir: Option<PathBuf>,
    workers: Option<usize>,
) -> Result<()> {
    let input = input.unwrap_or_else(|| config.paths.raw_metadata_path());
    let peak_dir = peak_dir.unwrap_or_else(|| config.paths.peak_dir());
    let mut download_config = config.download.clone();
    if workers.is_some() {
        download_config.workers = workers;
    }

    info!("Input:     {}", input.display());
    info!("Peak dir:  {}", peak_dir.display());
    info!("Remote:    {}", download_config.base_url);

    let transport = WgetTransport::from_config(&download_config);
    let stats = download_library_peaks(&input, &peak_dir, &download_config, &transport)
        .with_context(|| format!("Failed to download peaks listed in {}", input.display()))?;

    println!("Peak files: {}", stats);
    if stats.failed > 0 {
        eprintln!("{} downloads failed; run again to retry them", stats.failed);
        std::process::exit(1);
    }
    Ok(())
}
