//! MGF (Mascot Generic Format) input through `mzdata`.
//!
//! `mzdata` does the parsing; this module only adapts its spectra. The
//! identifier is the `TITLE`, falling back to `index=<n>`. A missing charge
//! defaults to 1 and negative charges keep their magnitude.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use mzdata::io::mgf::MGFReader;
use mzdata::prelude::*;
use mzdata::spectrum::MultiLayerSpectrum;

use super::{Spectrum, SpectrumError};

/// Read all spectra from an MGF file.
pub fn read_mgf_file<P: AsRef<Path>>(path: P) -> Result<Vec<Spectrum>, SpectrumError> {
    let path = path.as_ref();
    let spectra = read_spectra(File::open(path)?)?;
    debug!("Read {} spectra from {}", spectra.len(), path.display());
    Ok(spectra)
}

/// Read all spectra from MGF content.
pub fn read_spectra<R: Read>(reader: R) -> Result<Vec<Spectrum>, SpectrumError> {
    MGFReader::new(reader)
        .enumerate()
        .map(|(index, spectrum)| convert_spectrum(index, spectrum))
        .collect()
}

fn convert_spectrum(index: usize, spectrum: MultiLayerSpectrum) -> Result<Spectrum, SpectrumError> {
    let identifier = match spectrum.id() {
        "" => format!("index={}", index),
        id => id.to_string(),
    };

    let ion = spectrum.precursor().and_then(|precursor| precursor.iter().next());
    let precursor_mz = ion.map(|ion| ion.mz).filter(|mz| *mz > 0.0);
    let Some(precursor_mz) = precursor_mz else {
        return Err(invalid(&identifier, "no precursor m/z"));
    };
    let precursor_charge = ion
        .and_then(|ion| ion.charge)
        .map(|z| z.unsigned_abs())
        .filter(|z| *z > 0)
        .unwrap_or(1);

    let centroided = spectrum
        .into_centroid()
        .map_err(|e| invalid(&identifier, &e.to_string()))?;
    let (mz, intensity) = centroided
        .peaks
        .iter()
        .map(|peak| (peak.mz, peak.intensity))
        .unzip();

    Spectrum::new(identifier, precursor_mz, precursor_charge, mz, intensity)
}

fn invalid(identifier: &str, message: &str) -> SpectrumError {
    SpectrumError::InvalidSpectrum {
        identifier: identifier.to_string(),
        message: message.to_string(),
    }
}
