#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use specpair::encoder::{EncoderConfig, SpectrumEncoder};
use specpair::spectrum::{preprocess, PreprocessConfig};

fuzz_target!(|data: &[u8]| {
    // Malformed MGF must produce an error, never a panic
    let spectra = match specpair::spectrum::mgf::read_spectra(Cursor::new(data)) {
        Ok(spectra) => spectra,
        Err(_) => return,
    };

    // Whatever was parsed must survive preprocessing and encoding
    let encoder = match EncoderConfig::default().build(None) {
        Ok(encoder) => encoder,
        Err(_) => return,
    };
    for spectrum in spectra.iter().take(100) {
        let processed = preprocess(spectrum, 50.5, 2500.0, &PreprocessConfig::default());
        let features = encoder.encode(&processed.spectrum);
        assert_eq!(features.len(), encoder.num_features());
    }
});
