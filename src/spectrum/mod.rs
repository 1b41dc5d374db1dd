//! # Spectrum Model and Processing
//!
//! Fragmentation spectra as consumed by the encoders, together with the
//! processing primitives the encoders are built on:
//!
//! - [`preprocess`]: restrict, filter, scale and normalize a spectrum
//! - [`to_vector`]: bin fragment intensities into a dense vector
//! - [`dot`]: fragment-tolerant dot product between two spectra
//! - [`mgf`]: MGF reading through `mzdata`

mod error;
pub mod mgf;
mod processing;


use serde::{Deserialize, Serialize};

pub use error::SpectrumError;
pub use processing::{
    dot, get_num_bins, preprocess, to_vector, PreprocessConfig, ProcessedSpectrum,
};

/// Mass of a proton in Dalton.
pub const PROTON_MASS: f64 = 1.007_276_466_88;

/// A fragmentation spectrum with its precursor information.
///
/// Peaks are kept sorted by ascending m/z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Spectrum identifier (MGF title or scan reference)
    pub identifier: String,
    /// Precursor m/z
    pub precursor_mz: f64,
    /// Precursor charge
    pub precursor_charge: u32,
    /// Fragment m/z values (ascending)
    pub mz: Vec<f64>,
    /// Fragment intensities, parallel to `mz`
    pub intensity: Vec<f32>,
}

impl Spectrum {
    /// Create a spectrum from parallel peak arrays, sorting peaks by m/z.
    pub fn new(
        identifier: impl Into<String>,
        precursor_mz: f64,
        precursor_charge: u32,
        mz: Vec<f64>,
        intensity: Vec<f32>,
    ) -> Result<Self, SpectrumError> {
        if mz.len() != intensity.len() {
            return Err(SpectrumError::PeakLengthMismatch {
                mz: mz.len(),
                intensity: intensity.len(),
            });
        }
        let mut peaks: Vec<(f64, f32)> = mz.into_iter().zip(intensity).collect();
        peaks.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (mz, intensity) = peaks.into_iter().unzip();

        Ok(Self {
            identifier: identifier.into(),
            precursor_mz,
            precursor_charge,
            mz,
            intensity,
        })
    }

    /// Number of fragment peaks.
    pub fn len(&self) -> usize {
        self.mz.len()
    }

    /// Whether the spectrum has no fragment peaks.
    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Neutral mass of the precursor.
    pub fn precursor_neutral_mass(&self) -> f64 {
        neutral_mass_from_mz_charge(self.precursor_mz, self.precursor_charge)
    }
}

/// Builder for [`Spectrum`] values.
#[derive(Debug, Clone)]
pub struct SpectrumBuilder {
    identifier: String,
    precursor_mz: f64,
    precursor_charge: u32,
    peaks: Vec<(f64, f32)>,
}

impl SpectrumBuilder {
    /// Start a spectrum with the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            precursor_mz: 0.0,
            precursor_charge: 1,
            peaks: Vec::new(),
        }
    }

    /// Set precursor m/z and charge
    pub fn precursor(mut self, mz: f64, charge: u32) -> Self {
        self.precursor_mz = mz;
        self.precursor_charge = charge;
        self
    }

    /// Add a single fragment peak
    pub fn add_peak(mut self, mz: f64, intensity: f32) -> Self {
        self.peaks.push((mz, intensity));
        self
    }

    /// Finish the spectrum, sorting peaks by m/z.
    pub fn build(mut self) -> Spectrum {
        self.peaks.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (mz, intensity) = self.peaks.into_iter().unzip();
        Spectrum {
            identifier: self.identifier,
            precursor_mz: self.precursor_mz,
            precursor_charge: self.precursor_charge,
            mz,
            intensity,
        }
    }
}

/// Neutral mass for an ion observed at `mz` with the given charge.
pub fn neutral_mass_from_mz_charge(mz: f64, charge: u32) -> f64 {
    (mz - PROTON_MASS) * f64::from(charge)
}
