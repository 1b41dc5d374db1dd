use serde::{Deserialize, Serialize};

use super::Spectrum;

/// Settings for spectrum preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Minimum number of peaks for a spectrum to be valid
    pub min_peaks: usize,
    /// Minimum m/z span between the first and last peak
    pub min_mz_range: f64,
    /// Minimum intensity relative to the base peak
    pub min_intensity: f32,
    /// Maximum number of most intense peaks to retain
    pub max_peaks_used: usize,
    /// Peaks this close (m/z) to the precursor are removed
    pub remove_precursor_tolerance: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            min_peaks: 10,
            min_mz_range: 250.0,
            min_intensity: 0.01,
            max_peaks_used: 150,
            remove_precursor_tolerance: 0.05,
        }
    }
}

/// A preprocessed spectrum with its validity verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedSpectrum {
    /// The processed peaks
    pub spectrum: Spectrum,
    valid: bool,
}

impl ProcessedSpectrum {
    /// Whether enough signal survived preprocessing.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Unwrap the processed spectrum.
    pub fn into_inner(self) -> Spectrum {
        self.spectrum
    }
}

/// Preprocess a spectrum for similarity scoring.
///
/// Restricts peaks to `[min_mz, max_mz]`, removes the precursor peak, drops
/// low-intensity noise, keeps the most intense peaks, then square-root scales
/// and L2 normalizes the intensities.
pub fn preprocess(
    spectrum: &Spectrum,
    min_mz: f64,
    max_mz: f64,
    config: &PreprocessConfig,
) -> ProcessedSpectrum {
    let mut peaks: Vec<(f64, f32)> = spectrum
        .mz
        .iter()
        .zip(&spectrum.intensity)
        .filter(|(mz, _)| (min_mz..=max_mz).contains(*mz))
        .filter(|(mz, _)| {
            (**mz - spectrum.precursor_mz).abs() > config.remove_precursor_tolerance
        })
        .map(|(mz, intensity)| (*mz, *intensity))
        .collect();

    if !has_enough_signal(&peaks, config) {
        return invalid(spectrum, peaks);
    }

    let base_peak = peaks.iter().map(|p| p.1).fold(0.0f32, f32::max);
    let threshold = base_peak * config.min_intensity;
    peaks.retain(|p| p.1 >= threshold);
    if peaks.len() > config.max_peaks_used {
        peaks.sort_by(|a, b| b.1.total_cmp(&a.1));
        peaks.truncate(config.max_peaks_used);
        peaks.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    if !has_enough_signal(&peaks, config) {
        return invalid(spectrum, peaks);
    }

    let mut intensity: Vec<f32> = peaks.iter().map(|p| p.1.max(0.0).sqrt()).collect();
    normalize(&mut intensity);

    ProcessedSpectrum {
        spectrum: Spectrum {
            identifier: spectrum.identifier.clone(),
            precursor_mz: spectrum.precursor_mz,
            precursor_charge: spectrum.precursor_charge,
            mz: peaks.iter().map(|p| p.0).collect(),
            intensity,
        },
        valid: true,
    }
}

fn has_enough_signal(peaks: &[(f64, f32)], config: &PreprocessConfig) -> bool {
    match (peaks.first(), peaks.last()) {
        (Some(first), Some(last)) => {
            peaks.len() >= config.min_peaks && last.0 - first.0 >= config.min_mz_range
        }
        _ => false,
    }
}

fn invalid(spectrum: &Spectrum, peaks: Vec<(f64, f32)>) -> ProcessedSpectrum {
    let (mz, intensity) = peaks.into_iter().unzip();
    ProcessedSpectrum {
        spectrum: Spectrum {
            identifier: spectrum.identifier.clone(),
            precursor_mz: spectrum.precursor_mz,
            precursor_charge: spectrum.precursor_charge,
            mz,
            intensity,
        },
        valid: false,
    }
}

fn normalize(values: &mut [f32]) {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        values.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Number of bins needed to cover `[min_mz, max_mz)` with the given bin size.
pub fn get_num_bins(min_mz: f64, max_mz: f64, bin_size: f64) -> usize {
    ((max_mz - min_mz) / bin_size).ceil().max(0.0) as usize
}

/// Bin fragment intensities into a dense, L2 normalized vector.
///
/// Peaks outside `[min_mz, min_mz + num_bins * bin_size)` are ignored.
pub fn to_vector(
    mz: &[f64],
    intensity: &[f32],
    min_mz: f64,
    bin_size: f64,
    num_bins: usize,
) -> Vec<f32> {
    let mut vector = vec![0.0f32; num_bins];
    if num_bins == 0 {
        return vector;
    }
    for (&mz, &intensity) in mz.iter().zip(intensity) {
        if mz < min_mz {
            continue;
        }
        let bin = ((mz - min_mz) / bin_size).floor() as usize;
        if bin < num_bins {
            vector[bin] += intensity;
        }
    }
    normalize(&mut vector);
    vector
}

/// Fragment-tolerant dot product between two spectra.
///
/// Both peak lists must be sorted by m/z. Peaks are matched in a single
/// merge pass; each peak contributes to at most one match.
pub fn dot(
    mz: &[f64],
    intensity: &[f32],
    mz_other: &[f64],
    intensity_other: &[f32],
    fragment_mz_tolerance: f64,
) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut score = 0.0f32;
    while i < mz.len() && j < mz_other.len() {
        let diff = mz[i] - mz_other[j];
        if diff.abs() <= fragment_mz_tolerance {
            score += intensity[i] * intensity_other[j];
            i += 1;
            j += 1;
        } else if diff < 0.0 {
            i += 1;
        } else {
            j += 1;
        }
    }
    score
}
