//! TOML configuration for the pipeline.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```toml
//! # specpair.toml
//! [paths]
//! data_dir = "/data/specpair"
//! massivekb_task_id = "82c0124b6053407fa41ba98f53fd8d89"
//!
//! [split]
//! val_ratio = 0.1
//! test_ratio = 0.1
//!
//! [pairs]
//! mz_tolerance = 0.1
//!
//! [download]
//! workers = 8
//!
//! [encoder.fragment]
//! bin_size = 1.0005079
//!
//! [schedule]
//! retries = 3
//! retry_delay_secs = 300
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::download::DownloadConfig;
use crate::encoder::EncoderConfig;
use crate::metadata::SplitConfig;
use crate::spectrum::PreprocessConfig;

/// Environment variable that overrides `paths.data_dir`.
pub const DATA_DIR_ENV: &str = "SPECPAIR_HOME";

/// Root configuration structure for `specpair.toml` files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File locations
    pub paths: PathsConfig,
    /// Train/validation/test split settings
    pub split: SplitConfig,
    /// Pair generation settings
    pub pairs: PairsConfig,
    /// Peak download settings
    pub download: DownloadConfig,
    /// Spectrum encoder settings
    pub encoder: EncoderConfig,
    /// Spectrum preprocessing for feature export, and for the reference
    /// spectra unless `[encoder.reference.preprocess]` is set
    pub preprocess: PreprocessConfig,
    /// Pipeline schedule and retry policy
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the given file, or the defaults when no file is given, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(data_dir) = std::env::var_os(DATA_DIR_ENV) {
            config.paths.data_dir = PathBuf::from(data_dir);
        }
        Ok(config)
    }

    /// Encoder settings with the shared preprocessing filled in where the
    /// reference encoder does not set its own.
    pub fn encoder_config(&self) -> EncoderConfig {
        let mut encoder = self.encoder.clone();
        encoder
            .reference
            .preprocess
            .get_or_insert_with(|| self.preprocess.clone());
        encoder
    }
}

/// File locations. Unset paths are derived from `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory for all pipeline data
    pub data_dir: PathBuf,
    /// MassIVE-KB task the spectral library was created by
    pub massivekb_task_id: String,
    /// Directory the peak files are downloaded to
    pub peak_dir: Option<PathBuf>,
    /// Directory for feature tables
    pub feature_dir: Option<PathBuf>,
    /// MGF file with the reference spectra
    pub reference_spectra: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            massivekb_task_id: "82c0124b6053407fa41ba98f53fd8d89".to_string(),
            peak_dir: None,
            feature_dir: None,
            reference_spectra: None,
        }
    }
}

impl PathsConfig {
    fn massivekb_dir(&self) -> PathBuf {
        self.data_dir.join("massivekb")
    }

    /// The raw library TSV exported from MassIVE-KB.
    pub fn raw_metadata_path(&self) -> PathBuf {
        self.massivekb_dir().join(format!(
            "LIBRARY_CREATION_AUGMENT_LIBRARY_TEST-{}-candidate_library_spectra-main.tsv",
            self.massivekb_task_id
        ))
    }

    /// The converted metadata CSV.
    pub fn metadata_path(&self) -> PathBuf {
        self.massivekb_dir()
            .join(format!("metadata_{}.csv", self.massivekb_task_id))
    }

    /// Peak file directory.
    pub fn peak_dir(&self) -> PathBuf {
        self.peak_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("peak"))
    }

    /// Feature table directory.
    pub fn feature_dir(&self) -> PathBuf {
        self.feature_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("feature"))
    }
}

/// Pair generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairsConfig {
    /// Maximum precursor m/z difference of a negative pair
    pub mz_tolerance: f64,
}

impl Default for PairsConfig {
    fn default() -> Self {
        Self { mz_tolerance: 0.1 }
    }
}

/// Schedule and retry policy of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// First scheduled run
    pub start: DateTime<Utc>,
    /// Days between runs
    pub interval_days: u32,
    /// Extra attempts for a failing task
    pub retries: u32,
    /// Pause between attempts, in seconds
    pub retry_delay_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            interval_days: 7,
            retries: 3,
            retry_delay_secs: 300,
        }
    }
}

impl ScheduleConfig {
    /// Pause between attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pairs.mz_tolerance, 0.1);
        assert_eq!(config.split.val_ratio, 0.1);
        assert_eq!(config.split.test_ratio, 0.1);
        assert_eq!(config.download.tries, 3);
        assert_eq!(config.schedule.retries, 3);
        assert_eq!(config.schedule.retry_delay(), Duration::from_secs(300));
        assert_eq!(config.schedule.interval_days, 7);
        assert_eq!(config.encoder.precursor.charge_max, 7);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [paths]
            data_dir = "/tmp/specpair"
            massivekb_task_id = "abc"

            [pairs]
            mz_tolerance = 0.05

            [encoder.fragment]
            bin_size = 0.5

            [schedule]
            start = "2020-06-01T00:00:00Z"
            retry_delay_secs = 0
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.pairs.mz_tolerance, 0.05);
        assert_eq!(config.encoder.fragment.bin_size, 0.5);
        assert_eq!(config.encoder.fragment.min_mz, 50.5);
        assert_eq!(config.schedule.retries, 3);
        assert_eq!(config.schedule.retry_delay(), Duration::ZERO);
        assert_eq!(
            config.schedule.start,
            Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            config.paths.metadata_path(),
            PathBuf::from("/tmp/specpair/massivekb/metadata_abc.csv")
        );
        assert_eq!(
            config.paths.raw_metadata_path(),
            PathBuf::from(
                "/tmp/specpair/massivekb/LIBRARY_CREATION_AUGMENT_LIBRARY_TEST-abc-candidate_library_spectra-main.tsv"
            )
        );
        assert_eq!(config.paths.peak_dir(), PathBuf::from("/tmp/specpair/peak"));
        assert_eq!(config.paths.feature_dir(), PathBuf::from("/tmp/specpair/feature"));
    }

    #[test]
    fn test_explicit_peak_dir() {
        let toml = r#"
            [paths]
            peak_dir = "/mnt/peaks"
        "#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.paths.peak_dir(), PathBuf::from("/mnt/peaks"));
    }

    #[test]
    fn test_reference_preprocess_follows_shared_settings() {
        let shared = Config::from_str("[preprocess]\nmin_peaks = 5").unwrap();
        assert_eq!(shared.encoder.reference.preprocess, None);
        let encoder = shared.encoder_config();
        assert_eq!(encoder.reference.preprocess.map(|p| p.min_peaks), Some(5));

        let own = Config::from_str(
            "[preprocess]\nmin_peaks = 5\n[encoder.reference.preprocess]\nmin_peaks = 20",
        )
        .unwrap();
        let encoder = own.encoder_config();
        assert_eq!(encoder.reference.preprocess.map(|p| p.min_peaks), Some(20));
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::from_str("[pairs]\nmz_tolerance = \"wide\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/specpair.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
