use std::path::Path;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::spectrum::{dot, mgf, preprocess, PreprocessConfig, Spectrum};

use super::{EncoderError, SpectrumEncoder};

/// Settings for [`ReferenceSpectraEncoder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Lowest fragment m/z kept in the reference spectra
    pub min_mz: f64,
    /// Highest fragment m/z kept in the reference spectra
    pub max_mz: f64,
    /// Fragment m/z tolerance for the dot product
    pub fragment_mz_tolerance: f64,
    /// Number of reference spectra to sample
    pub num_ref_spectra: usize,
    /// Seed for sampling the reference spectra
    pub seed: u64,
    /// Preprocessing applied to the reference spectra; unset follows the
    /// top-level `[preprocess]` settings
    pub preprocess: Option<PreprocessConfig>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            min_mz: 50.5,
            max_mz: 2500.0,
            fragment_mz_tolerance: 0.05,
            num_ref_spectra: 500,
            seed: 42,
            preprocess: None,
        }
    }
}

/// Encodes a spectrum by its similarity to a fixed set of reference spectra.
///
/// The reference set is sampled and preprocessed once, at construction.
/// Feature names are assigned to every sampled reference, while the encoded
/// vector only scores the references that passed preprocessing, so the two
/// lengths differ when some references were invalid.
#[derive(Debug, Clone)]
pub struct ReferenceSpectraEncoder {
    fragment_mz_tolerance: f64,
    references: Vec<Spectrum>,
    feature_names: Vec<String>,
}

impl ReferenceSpectraEncoder {
    /// Build the encoder from the spectra in an MGF file.
    pub fn from_mgf<P: AsRef<Path>>(path: P, config: &ReferenceConfig) -> Result<Self, EncoderError> {
        debug!("Read the reference spectra from {}", path.as_ref().display());
        let spectra = mgf::read_mgf_file(path)?;
        Self::new(spectra, config)
    }

    /// Build the encoder from in-memory reference spectra.
    pub fn new(spectra: Vec<Spectrum>, config: &ReferenceConfig) -> Result<Self, EncoderError> {
        if !(config.fragment_mz_tolerance.is_finite() && config.fragment_mz_tolerance >= 0.0) {
            return Err(EncoderError::InvalidConfig(format!(
                "fragment m/z tolerance must be non-negative, got {}",
                config.fragment_mz_tolerance
            )));
        }
        if !(config.min_mz < config.max_mz) {
            return Err(EncoderError::InvalidConfig(format!(
                "reference m/z range [{}, {}] is empty",
                config.min_mz, config.max_mz
            )));
        }

        let available = spectra.len();
        let required = config.num_ref_spectra;
        if available < required {
            return Err(EncoderError::InsufficientReferenceSpectra { available, required });
        }
        let sampled = if available > required {
            debug!("Select {} reference spectra (was {})", required, available);
            let mut rng = StdRng::seed_from_u64(config.seed);
            spectra.choose_multiple(&mut rng, required).cloned().collect()
        } else {
            spectra
        };

        let feature_names = (0..sampled.len()).map(|i| format!("ref_{}", i)).collect();

        debug!("Vectorize the reference spectra");
        let preprocess_config = config.preprocess.clone().unwrap_or_default();
        let references: Vec<Spectrum> = sampled
            .iter()
            .map(|spectrum| preprocess(spectrum, config.min_mz, config.max_mz, &preprocess_config))
            .filter(|processed| processed.is_valid())
            .map(|processed| processed.into_inner())
            .collect();
        debug!(
            "{} of {} reference spectra are valid",
            references.len(),
            sampled.len()
        );

        Ok(Self {
            fragment_mz_tolerance: config.fragment_mz_tolerance,
            references,
            feature_names,
        })
    }

    /// Number of references that are scored per spectrum.
    pub fn num_references(&self) -> usize {
        self.references.len()
    }
}

impl SpectrumEncoder for ReferenceSpectraEncoder {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn encode(&self, spectrum: &Spectrum) -> Vec<f32> {
        self.references
            .iter()
            .map(|reference| {
                dot(
                    &reference.mz,
                    &reference.intensity,
                    &spectrum.mz,
                    &spectrum.intensity,
                    self.fragment_mz_tolerance,
                )
            })
            .collect()
    }

    fn num_features(&self) -> usize {
        self.references.len()
    }
}
