use super::*;
use crate::spectrum::{PreprocessConfig, SpectrumBuilder};
use std::fs;
use tempfile::tempdir;

fn small_precursor_config() -> PrecursorConfig {
    PrecursorConfig {
        num_bits_mz: 4,
        mz_min: 0.0,
        mz_max: 1000.0,
        num_bits_mass: 5,
        mass_min: 0.0,
        mass_max: 5000.0,
        charge_max: 3,
    }
}

fn spectrum_with_charge(charge: u32) -> Spectrum {
    SpectrumBuilder::new("s")
        .precursor(500.0, charge)
        .add_peak(100.0, 1.0)
        .build()
}

/// A reference spectrum with enough signal to survive preprocessing.
fn reference(id: usize, offset: f64) -> Spectrum {
    let mut builder = SpectrumBuilder::new(format!("ref_{}", id)).precursor(3000.0, 2);
    for i in 0..20 {
        builder = builder.add_peak(100.0 + offset + i as f64 * 20.0, 10.0 + i as f32);
    }
    builder.build()
}

fn reference_config(num_ref_spectra: usize) -> ReferenceConfig {
    ReferenceConfig {
        num_ref_spectra,
        ..Default::default()
    }
}

#[test]
fn test_precursor_feature_layout() {
    let encoder = PrecursorEncoder::new(small_precursor_config()).unwrap();
    let names = encoder.feature_names();
    assert_eq!(names.len(), 4 + 5 + 3);
    assert_eq!(names[0], "precursor_mz_0");
    assert_eq!(names[4], "precursor_mass_0");
    assert_eq!(names[9], "precursor_charge_0");

    let features = encoder.encode(&spectrum_with_charge(2));
    assert_eq!(features.len(), names.len());
    assert!(features.iter().all(|&v| v == 0.0 || v == 1.0));
}

#[test]
fn test_precursor_charge_one_hot() {
    let encoder = PrecursorEncoder::new(small_precursor_config()).unwrap();
    // Charge 0 wraps around to the last bin
    for (charge, active) in [(0, 2), (1, 0), (2, 1), (3, 2), (4, 2), (9, 2)] {
        let features = encoder.encode(&spectrum_with_charge(charge));
        let one_hot = &features[9..];
        assert_eq!(one_hot.iter().sum::<f32>(), 1.0);
        assert_eq!(one_hot[active], 1.0, "charge {}", charge);
    }
    assert_eq!(encoder.charge_index(0), 2);

    let single = PrecursorEncoder::new(PrecursorConfig {
        charge_max: 1,
        ..small_precursor_config()
    })
    .unwrap();
    assert_eq!(single.charge_index(0), 0);
}

#[test]
fn test_precursor_mz_bits_are_gray_coded() {
    let encoder = PrecursorEncoder::new(small_precursor_config()).unwrap();
    // 500 / 1000 * 15 = 7.5 -> 7 -> gray 0100
    let features = encoder.encode(&spectrum_with_charge(2));
    assert_eq!(&features[..4], &[0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_precursor_rejects_bad_config() {
    let config = PrecursorConfig {
        charge_max: 0,
        ..small_precursor_config()
    };
    assert!(matches!(PrecursorEncoder::new(config), Err(EncoderError::InvalidConfig(_))));

    let config = PrecursorConfig {
        mz_min: 10.0,
        mz_max: 10.0,
        ..small_precursor_config()
    };
    assert!(PrecursorEncoder::new(config).is_err());

    let config = PrecursorConfig {
        num_bits_mass: 64,
        ..small_precursor_config()
    };
    assert!(PrecursorEncoder::new(config).is_err());
}

#[test]
fn test_fragment_encoder_bins() {
    let encoder = FragmentEncoder::new(FragmentConfig {
        min_mz: 100.0,
        max_mz: 110.0,
        bin_size: 2.0,
    })
    .unwrap();
    assert_eq!(encoder.num_bins(), 5);
    assert_eq!(encoder.feature_names()[4], "fragment_bin_4");

    let spectrum = SpectrumBuilder::new("s")
        .precursor(500.0, 2)
        .add_peak(101.0, 3.0)
        .add_peak(109.5, 4.0)
        .add_peak(150.0, 100.0)
        .build();
    let features = encoder.encode(&spectrum);
    assert_eq!(features.len(), 5);
    assert!((features[0] - 0.6).abs() < 1e-6);
    assert!((features[4] - 0.8).abs() < 1e-6);
}

#[test]
fn test_fragment_rejects_bad_bin_size() {
    let config = FragmentConfig {
        bin_size: 0.0,
        ..Default::default()
    };
    assert!(FragmentEncoder::new(config).is_err());
}

#[test]
fn test_reference_insufficient_spectra() {
    let spectra = vec![reference(0, 0.0), reference(1, 1.0)];
    match ReferenceSpectraEncoder::new(spectra, &reference_config(3)) {
        Err(EncoderError::InsufficientReferenceSpectra { available, required }) => {
            assert_eq!(available, 2);
            assert_eq!(required, 3);
        }
        other => panic!("expected insufficient spectra error, got {:?}", other),
    }
}

#[test]
fn test_reference_sampling_is_seeded() {
    let spectra: Vec<Spectrum> = (0..10).map(|i| reference(i, i as f64 * 0.5)).collect();
    let a = ReferenceSpectraEncoder::new(spectra.clone(), &reference_config(4)).unwrap();
    let b = ReferenceSpectraEncoder::new(spectra.clone(), &reference_config(4)).unwrap();
    assert_eq!(a.feature_names().len(), 4);
    assert_eq!(a.num_references(), 4);

    let query = reference(99, 1.0);
    assert_eq!(a.encode(&query), b.encode(&query));
}

#[test]
fn test_reference_self_similarity() {
    let spectra = vec![reference(0, 0.0)];
    let encoder = ReferenceSpectraEncoder::new(spectra, &reference_config(1)).unwrap();

    let query = crate::spectrum::preprocess(&reference(0, 0.0), 50.5, 2500.0, &PreprocessConfig::default());
    let features = encoder.encode(&query.spectrum);
    assert_eq!(features.len(), 1);
    assert!((features[0] - 1.0).abs() < 1e-5);
}

#[test]
fn test_reference_invalid_spectra_shorten_output_not_names() {
    let too_small = SpectrumBuilder::new("tiny")
        .precursor(500.0, 2)
        .add_peak(200.0, 1.0)
        .build();
    let spectra = vec![reference(0, 0.0), too_small, reference(2, 3.0)];
    let encoder = ReferenceSpectraEncoder::new(spectra, &reference_config(3)).unwrap();

    assert_eq!(encoder.feature_names().len(), 3);
    assert_eq!(encoder.num_references(), 2);
    assert_eq!(encoder.encode(&reference(5, 0.0)).len(), 2);
    assert_eq!(encoder.num_features(), 2);
}

#[test]
fn test_composite_concatenates_in_order() {
    let precursor = PrecursorEncoder::new(small_precursor_config()).unwrap();
    let fragment = FragmentEncoder::new(FragmentConfig {
        min_mz: 0.0,
        max_mz: 200.0,
        bin_size: 10.0,
    })
    .unwrap();
    let spectrum = spectrum_with_charge(2);
    let expected: Vec<f32> = precursor
        .encode(&spectrum)
        .into_iter()
        .chain(fragment.encode(&spectrum))
        .collect();

    let composite = CompositeEncoder::new(vec![precursor.into(), fragment.into()]);
    let features = composite.encode(&spectrum);

    assert_eq!(features, expected);
    assert_eq!(composite.num_features(), 12 + 20);
    assert_eq!(composite.feature_names().len(), features.len());
    assert_eq!(composite.feature_names()[12], "fragment_bin_0");
}

#[test]
fn test_encoder_config_build_without_references() {
    let encoder = EncoderConfig::default().build(None).unwrap();
    let expected = 27 + 27 + 7 + 2449;
    assert_eq!(encoder.num_features(), expected);
    assert_eq!(encoder.feature_names().len(), expected);
    assert_eq!(encoder.encode(&spectrum_with_charge(2)).len(), expected);
}

#[test]
fn test_write_feature_table() {
    let encoder = PrecursorEncoder::new(PrecursorConfig {
        num_bits_mz: 2,
        num_bits_mass: 1,
        charge_max: 2,
        ..small_precursor_config()
    })
    .unwrap();
    let spectra = vec![spectrum_with_charge(1), spectrum_with_charge(2)];
    let mut buffer = Vec::new();
    let rows = write_feature_table(&encoder, &spectra, &mut buffer).unwrap();

    assert_eq!(rows, 2);
    let text = String::from_utf8(buffer).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("identifier,precursor_mz_0,precursor_mz_1,precursor_mass_0,precursor_charge_0,precursor_charge_1")
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_convert_spectra_to_features() {
    let dir = tempdir().unwrap();
    let mgf = dir.path().join("spectra.mgf");
    let mut content = String::new();
    for id in ["good_a", "good_b"] {
        content.push_str(&format!("BEGIN IONS\nTITLE={}\nPEPMASS=3000.0\nCHARGE=2+\n", id));
        for i in 0..20 {
            content.push_str(&format!("{} {}\n", 100 + i * 20, 10 + i));
        }
        content.push_str("END IONS\n");
    }
    content.push_str("BEGIN IONS\nTITLE=bad\nPEPMASS=400.0\n150 1\nEND IONS\n");
    fs::write(&mgf, content).unwrap();

    let encoder = EncoderConfig::default().build(None).unwrap();
    let output = dir.path().join("features.csv");
    let (outcome, stats) = convert_spectra_to_features(
        &encoder,
        &mgf,
        &output,
        50.5,
        2500.0,
        &PreprocessConfig::default(),
    )
    .unwrap();

    assert!(outcome.is_written());
    assert_eq!(stats.spectra_read, 3);
    assert_eq!(stats.spectra_encoded, 2);
    assert_eq!(stats.spectra_invalid, 1);
    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 3);

    let (outcome, _) = convert_spectra_to_features(
        &encoder,
        &mgf,
        &output,
        50.5,
        2500.0,
        &PreprocessConfig::default(),
    )
    .unwrap();
    assert!(!outcome.is_written());
}
