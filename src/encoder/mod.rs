//! # Spectrum Encoders
//!
//! Encoders turn a [`Spectrum`] into a fixed-length feature vector for the
//! embedding model. Every encoder knows its feature names up front and
//! encodes each spectrum independently of any other.
//!
//! | Encoder | Features |
//! |---------|----------|
//! | [`PrecursorEncoder`] | gray-coded precursor m/z and neutral mass, one-hot charge |
//! | [`FragmentEncoder`] | binned, normalized fragment intensities |
//! | [`ReferenceSpectraEncoder`] | dot product to each of a set of reference spectra |
//! | [`CompositeEncoder`] | concatenation of child encoders, in order |
//!
//! The variants form the closed [`Encoder`] enum; [`EncoderConfig::build`]
//! assembles the standard composite from configuration.

mod error;
mod export;
mod fragment;
pub mod gray;
mod precursor;
mod reference;

#[cfg(test)]
mod tests;

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::spectrum::Spectrum;

pub use error::EncoderError;
pub use export::{convert_spectra_to_features, write_feature_table, ExportStats};
pub use fragment::{FragmentConfig, FragmentEncoder};
pub use precursor::{PrecursorConfig, PrecursorEncoder};
pub use reference::{ReferenceConfig, ReferenceSpectraEncoder};

/// Capability shared by all spectrum encoders.
pub trait SpectrumEncoder {
    /// Names of the features, fixed at construction.
    fn feature_names(&self) -> &[String];

    /// Encode one spectrum.
    fn encode(&self, spectrum: &Spectrum) -> Vec<f32>;

    /// Length of the vectors produced by [`SpectrumEncoder::encode`].
    fn num_features(&self) -> usize {
        self.feature_names().len()
    }
}

/// Concatenates the output of child encoders in order.
#[derive(Debug, Clone)]
pub struct CompositeEncoder {
    encoders: Vec<Encoder>,
    feature_names: Vec<String>,
}

impl CompositeEncoder {
    /// Combine the given encoders.
    pub fn new(encoders: Vec<Encoder>) -> Self {
        let feature_names = encoders
            .iter()
            .flat_map(|e| e.feature_names().iter().cloned())
            .collect();
        Self {
            encoders,
            feature_names,
        }
    }

    /// Child encoders in output order.
    pub fn encoders(&self) -> &[Encoder] {
        &self.encoders
    }
}

impl SpectrumEncoder for CompositeEncoder {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn encode(&self, spectrum: &Spectrum) -> Vec<f32> {
        let mut features = Vec::with_capacity(self.num_features());
        for encoder in &self.encoders {
            features.extend(encoder.encode(spectrum));
        }
        features
    }

    fn num_features(&self) -> usize {
        self.encoders.iter().map(|e| e.num_features()).sum()
    }
}

/// Any of the supported encoders.
#[derive(Debug, Clone)]
pub enum Encoder {
    /// Precursor features
    Precursor(PrecursorEncoder),
    /// Binned fragment features
    Fragment(FragmentEncoder),
    /// Reference spectrum similarities
    ReferenceSpectra(ReferenceSpectraEncoder),
    /// Concatenation of several encoders
    Composite(CompositeEncoder),
}

impl SpectrumEncoder for Encoder {
    fn feature_names(&self) -> &[String] {
        match self {
            Encoder::Precursor(e) => e.feature_names(),
            Encoder::Fragment(e) => e.feature_names(),
            Encoder::ReferenceSpectra(e) => e.feature_names(),
            Encoder::Composite(e) => e.feature_names(),
        }
    }

    fn encode(&self, spectrum: &Spectrum) -> Vec<f32> {
        match self {
            Encoder::Precursor(e) => e.encode(spectrum),
            Encoder::Fragment(e) => e.encode(spectrum),
            Encoder::ReferenceSpectra(e) => e.encode(spectrum),
            Encoder::Composite(e) => e.encode(spectrum),
        }
    }

    fn num_features(&self) -> usize {
        match self {
            Encoder::Precursor(e) => e.num_features(),
            Encoder::Fragment(e) => e.num_features(),
            Encoder::ReferenceSpectra(e) => e.num_features(),
            Encoder::Composite(e) => e.num_features(),
        }
    }
}

impl From<PrecursorEncoder> for Encoder {
    fn from(e: PrecursorEncoder) -> Self {
        Encoder::Precursor(e)
    }
}

impl From<FragmentEncoder> for Encoder {
    fn from(e: FragmentEncoder) -> Self {
        Encoder::Fragment(e)
    }
}

impl From<ReferenceSpectraEncoder> for Encoder {
    fn from(e: ReferenceSpectraEncoder) -> Self {
        Encoder::ReferenceSpectra(e)
    }
}

impl From<CompositeEncoder> for Encoder {
    fn from(e: CompositeEncoder) -> Self {
        Encoder::Composite(e)
    }
}

/// Settings for the standard encoder stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Precursor encoder settings
    pub precursor: PrecursorConfig,
    /// Fragment encoder settings
    pub fragment: FragmentConfig,
    /// Reference spectra encoder settings
    pub reference: ReferenceConfig,
}

impl EncoderConfig {
    /// Build the composite of precursor, fragment and, when a reference
    /// spectra file is given, reference spectra encoders.
    pub fn build(&self, reference_spectra: Option<&Path>) -> Result<Encoder, EncoderError> {
        let mut encoders: Vec<Encoder> = vec![
            PrecursorEncoder::new(self.precursor.clone())?.into(),
            FragmentEncoder::new(self.fragment.clone())?.into(),
        ];
        if let Some(path) = reference_spectra {
            encoders.push(ReferenceSpectraEncoder::from_mgf(path, &self.reference)?.into());
        }
        let composite = CompositeEncoder::new(encoders);
        debug!("Built encoder with {} features", composite.num_features());
        Ok(composite.into())
    }
}
