use anyhow::{Context, Result};
use std::path::PathBuf;

use specpair::config::Config;
use specpair::metadata::split_metadata;

/// Split the metadata CSV into train/val/test partitions
pub fn run(
    config: &Config,
    metadata: Option<PathBuf>,
    val_ratio: Option<f64>,
    test_ratio: Option<f64>,
    seed: Option<u64>,
) -> Result<()> {
    let metadata = metadata.unwrap_or_else(|| config.paths.metadata_path());
    let mut split_config = config.split.clone();
    if let Some(val_ratio) = val_ratio {
        split_config.val_ratio = val_ratio;
    }
    if let Some(test_ratio) = test_ratio {
        split_config.test_ratio = test_ratio;
    }
    if let Some(seed) = seed {
        split_config.seed = seed;
    }

    let (outcome, paths, stats) = split_metadata(&metadata, &split_config)
        .with_context(|| format!("Failed to split {}", metadata.display()))?;

    println!("Split {}", outcome);
    match stats {
        Some(stats) => {
            println!("  train: {} ({} rows)", paths.train.display(), stats.train_rows);
            println!("  val:   {} ({} rows)", paths.val.display(), stats.val_rows);
            println!("  test:  {} ({} rows)", paths.test.display(), stats.test_rows);
        }
        None => {
            println!("  train: {}", paths.train.display());
            println!("  val:   {}", paths.val.display());
            println!("  test:  {}", paths.test.display());
        }
    }
    Ok(())
}
