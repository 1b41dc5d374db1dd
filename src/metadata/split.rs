use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::output::{write_if_absent, StepOutcome};

use super::records::{read_metadata, write_metadata, MetadataRow};
use super::MetadataError;

/// Settings for the dataset-level train/validation/test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Target share of rows in the validation partition
    pub val_ratio: f64,
    /// Target share of rows in the test partition
    pub test_ratio: f64,
    /// Relative deviation from a target share that triggers a warning
    pub rel_tol: f64,
    /// Seed for shuffling datasets
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            val_ratio: 0.1,
            test_ratio: 0.1,
            rel_tol: 0.01,
            seed: 42,
        }
    }
}

impl SplitConfig {
    fn validate(&self) -> Result<(), MetadataError> {
        let in_range = |r: f64| (0.0..1.0).contains(&r);
        if !in_range(self.val_ratio) || !in_range(self.test_ratio) {
            return Err(MetadataError::InvalidSplit(format!(
                "ratios must lie in [0, 1) (val {}, test {})",
                self.val_ratio, self.test_ratio
            )));
        }
        if self.val_ratio + self.test_ratio >= 1.0 {
            return Err(MetadataError::InvalidSplit(format!(
                "val ratio {} and test ratio {} leave no training data",
                self.val_ratio, self.test_ratio
            )));
        }
        Ok(())
    }
}

/// Output files of a metadata split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPaths {
    /// Training partition
    pub train: PathBuf,
    /// Validation partition
    pub val: PathBuf,
    /// Test partition
    pub test: PathBuf,
}

impl SplitPaths {
    fn all_exist(&self) -> bool {
        self.train.is_file() && self.val.is_file() && self.test.is_file()
    }
}

/// Row counts per partition after a split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitStats {
    /// Rows in the training partition
    pub train_rows: usize,
    /// Rows in the validation partition
    pub val_rows: usize,
    /// Rows in the test partition
    pub test_rows: usize,
}

/// Derive the partition file names: `metadata.csv` → `metadata_train.csv`, ...
pub fn split_paths<P: AsRef<Path>>(metadata_path: P) -> SplitPaths {
    let path = metadata_path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let with_suffix = |suffix: &str| path.with_file_name(format!("{}_{}.csv", stem, suffix));
    SplitPaths {
        train: with_suffix("train"),
        val: with_suffix("val"),
        test: with_suffix("test"),
    }
}

#[derive(Clone, Copy)]
enum Partition {
    Train,
    Val,
    Test,
}

/// Split the metadata into train, validation and test partitions by dataset.
///
/// All rows of a dataset land in the same partition. Datasets are shuffled
/// with the configured seed and assigned to the test partition until its
/// target share is reached, then to validation, and the remainder to training.
/// Rows keep their relative order within each partition. Nothing is written if
/// all three partition files already exist; when only some exist, the missing
/// ones are written and the existing ones are left untouched.
pub fn split_metadata<P: AsRef<Path>>(
    metadata_path: P,
    config: &SplitConfig,
) -> Result<(StepOutcome, SplitPaths, Option<SplitStats>), MetadataError> {
    config.validate()?;
    let metadata_path = metadata_path.as_ref();
    let paths = split_paths(metadata_path);
    if paths.all_exist() {
        info!("Metadata split of {} exists, skipping", metadata_path.display());
        return Ok((StepOutcome::Skipped, paths, None));
    }

    info!("Split metadata {} into train/val/test", metadata_path.display());
    let rows = read_metadata(metadata_path)?;
    let assignment = assign_datasets(&rows, config);

    let mut train = Vec::new();
    let mut val = Vec::new();
    let mut test = Vec::new();
    for row in &rows {
        match assignment.get(row.dataset.as_str()) {
            Some(Partition::Test) => test.push(row),
            Some(Partition::Val) => val.push(row),
            _ => train.push(row),
        }
    }

    let stats = SplitStats {
        train_rows: train.len(),
        val_rows: val.len(),
        test_rows: test.len(),
    };
    check_ratio("validation", stats.val_rows, rows.len(), config.val_ratio, config.rel_tol);
    check_ratio("test", stats.test_rows, rows.len(), config.test_ratio, config.rel_tol);

    for (path, partition) in [(&paths.train, &train), (&paths.val, &val), (&paths.test, &test)] {
        debug!("Save {} rows to {}", partition.len(), path.display());
        let outcome = write_if_absent(path, |writer| write_metadata(writer, partition.iter().copied()))?;
        if !outcome.is_written() {
            warn!("Keeping existing partition {}", path.display());
        }
    }
    Ok((StepOutcome::Written, paths, Some(stats)))
}

fn assign_datasets<'a>(rows: &'a [MetadataRow], config: &SplitConfig) -> HashMap<&'a str, Partition> {
    let mut sizes: HashMap<&str, usize> = HashMap::new();
    let mut datasets: Vec<&str> = Vec::new();
    for row in rows {
        let count = sizes.entry(row.dataset.as_str()).or_insert(0);
        if *count == 0 {
            datasets.push(row.dataset.as_str());
        }
        *count += 1;
    }
    datasets.sort_unstable();
    datasets.shuffle(&mut StdRng::seed_from_u64(config.seed));

    let total = rows.len() as f64;
    let test_target = config.test_ratio * total;
    let val_target = config.val_ratio * total;
    let (mut test_rows, mut val_rows) = (0usize, 0usize);

    let mut assignment = HashMap::with_capacity(datasets.len());
    for dataset in datasets {
        let size = sizes.get(dataset).copied().unwrap_or(0);
        let partition = if (test_rows as f64) < test_target {
            test_rows += size;
            Partition::Test
        } else if (val_rows as f64) < val_target {
            val_rows += size;
            Partition::Val
        } else {
            Partition::Train
        };
        assignment.insert(dataset, partition);
    }
    assignment
}

fn check_ratio(name: &str, rows: usize, total: usize, target: f64, rel_tol: f64) {
    if total == 0 || target == 0.0 {
        return;
    }
    let realized = rows as f64 / total as f64;
    if (realized - target).abs() > rel_tol * target {
        warn!(
            "Realized {} share {:.4} deviates from target {:.4}",
            name, realized, target
        );
    }
}
