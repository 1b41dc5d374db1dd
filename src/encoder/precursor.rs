use serde::{Deserialize, Serialize};

use crate::spectrum::Spectrum;

use super::gray::binary_encode;
use super::{EncoderError, SpectrumEncoder};

/// Settings for [`PrecursorEncoder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecursorConfig {
    /// Bits used to encode the precursor m/z
    pub num_bits_mz: u32,
    /// Lower bound of the precursor m/z scale
    pub mz_min: f64,
    /// Upper bound of the precursor m/z scale
    pub mz_max: f64,
    /// Bits used to encode the precursor neutral mass
    pub num_bits_mass: u32,
    /// Lower bound of the neutral mass scale
    pub mass_min: f64,
    /// Upper bound of the neutral mass scale
    pub mass_max: f64,
    /// Length of the charge one-hot vector; higher charges share the last bin
    pub charge_max: u32,
}

impl Default for PrecursorConfig {
    fn default() -> Self {
        Self {
            num_bits_mz: 27,
            mz_min: 50.5,
            mz_max: 2500.0,
            num_bits_mass: 27,
            mass_min: 400.0,
            mass_max: 6000.0,
            charge_max: 7,
        }
    }
}

/// Encodes the precursor: gray-coded m/z, gray-coded neutral mass and a
/// one-hot charge.
#[derive(Debug, Clone)]
pub struct PrecursorEncoder {
    config: PrecursorConfig,
    feature_names: Vec<String>,
}

fn check_scale(name: &str, bits: u32, min: f64, max: f64) -> Result<(), EncoderError> {
    if !(1..=63).contains(&bits) {
        return Err(EncoderError::InvalidConfig(format!(
            "{} needs between 1 and 63 bits, got {}",
            name, bits
        )));
    }
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(EncoderError::InvalidConfig(format!(
            "{} range [{}, {}] is empty",
            name, min, max
        )));
    }
    Ok(())
}

impl PrecursorEncoder {
    /// Create a precursor encoder.
    pub fn new(config: PrecursorConfig) -> Result<Self, EncoderError> {
        check_scale("precursor m/z", config.num_bits_mz, config.mz_min, config.mz_max)?;
        check_scale(
            "precursor mass",
            config.num_bits_mass,
            config.mass_min,
            config.mass_max,
        )?;
        if config.charge_max == 0 {
            return Err(EncoderError::InvalidConfig(
                "charge_max must be at least 1".to_string(),
            ));
        }

        let feature_names = (0..config.num_bits_mz)
            .map(|i| format!("precursor_mz_{}", i))
            .chain((0..config.num_bits_mass).map(|i| format!("precursor_mass_{}", i)))
            .chain((0..config.charge_max).map(|i| format!("precursor_charge_{}", i)))
            .collect();
        Ok(Self {
            config,
            feature_names,
        })
    }

    /// Index of the active charge bin.
    ///
    /// Charges above `charge_max` share the last bin. An unknown charge (0)
    /// also wraps around to the last bin.
    pub fn charge_index(&self, charge: u32) -> usize {
        let max = self.config.charge_max;
        match charge {
            0 => (max - 1) as usize,
            z => (z.min(max) - 1) as usize,
        }
    }
}

impl SpectrumEncoder for PrecursorEncoder {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn encode(&self, spectrum: &Spectrum) -> Vec<f32> {
        let c = &self.config;
        let mut features = Vec::with_capacity(self.feature_names.len());
        features.extend(binary_encode(
            spectrum.precursor_mz,
            c.mz_min,
            c.mz_max,
            c.num_bits_mz,
        ));
        features.extend(binary_encode(
            spectrum.precursor_neutral_mass(),
            c.mass_min,
            c.mass_max,
            c.num_bits_mass,
        ));
        let mut one_hot = vec![0.0f32; c.charge_max as usize];
        one_hot[self.charge_index(spectrum.precursor_charge)] = 1.0;
        features.extend(one_hot);
        features
    }
}
