use serde::{Deserialize, Serialize};

use crate::spectrum::{get_num_bins, to_vector, Spectrum};

use super::{EncoderError, SpectrumEncoder};

/// Settings for [`FragmentEncoder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    /// Lowest fragment m/z included
    pub min_mz: f64,
    /// Highest fragment m/z included
    pub max_mz: f64,
    /// Bin width in m/z
    pub bin_size: f64,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            min_mz: 50.5,
            max_mz: 2500.0,
            bin_size: 1.000_507_9,
        }
    }
}

/// Encodes fragment peaks as a binned intensity vector.
#[derive(Debug, Clone)]
pub struct FragmentEncoder {
    config: FragmentConfig,
    num_bins: usize,
    feature_names: Vec<String>,
}

impl FragmentEncoder {
    /// Create a fragment encoder.
    pub fn new(config: FragmentConfig) -> Result<Self, EncoderError> {
        if !(config.bin_size.is_finite() && config.bin_size > 0.0) {
            return Err(EncoderError::InvalidConfig(format!(
                "bin size must be positive, got {}",
                config.bin_size
            )));
        }
        if !(config.min_mz.is_finite() && config.max_mz.is_finite() && config.min_mz < config.max_mz) {
            return Err(EncoderError::InvalidConfig(format!(
                "fragment m/z range [{}, {}] is empty",
                config.min_mz, config.max_mz
            )));
        }
        let num_bins = get_num_bins(config.min_mz, config.max_mz, config.bin_size);
        let feature_names = (0..num_bins).map(|i| format!("fragment_bin_{}", i)).collect();
        Ok(Self {
            config,
            num_bins,
            feature_names,
        })
    }

    /// Number of m/z bins.
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }
}

impl SpectrumEncoder for FragmentEncoder {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn encode(&self, spectrum: &Spectrum) -> Vec<f32> {
        to_vector(
            &spectrum.mz,
            &spectrum.intensity,
            self.config.min_mz,
            self.config.bin_size,
            self.num_bins,
        )
    }
}
