//! # specpair - Spectrum-Pair Training Data Pipeline
//!
//! `specpair` prepares training data for a siamese embedding model of
//! tandem mass spectra from a public spectral library (MassIVE-KB):
//!
//! - **Metadata**: converts the library's peptide-spectrum match table into a
//!   compact, sorted metadata CSV and splits it by dataset into
//!   train/validation/test partitions.
//! - **Peak download**: fetches the referenced peak files in parallel,
//!   tolerating individual failures.
//! - **Pairs**: emits index pairs of matches that share a peptide and charge
//!   (positive) or have different peptides at a similar precursor m/z
//!   (negative).
//! - **Encoders**: turn a spectrum into a fixed-length feature vector from
//!   precursor information, binned fragments and similarities to reference
//!   spectra.
//! - **Pipeline**: a static task graph that runs the steps in dependency
//!   order with retries, on a weekly schedule.
//!
//! Every step that writes a file is idempotent: an existing output counts as
//! done, and outputs are renamed into place only once complete.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use specpair::metadata::convert_metadata;
//! use specpair::pairs::{generate_pairs_negative, generate_pairs_positive};
//!
//! convert_metadata("library.tsv", "metadata.csv")?;
//! generate_pairs_positive("metadata.csv", "metadata_pairs_pos.csv")?;
//! generate_pairs_negative("metadata.csv", "metadata_pairs_neg.csv", 0.1)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Encoding Spectra
//!
//! ```rust
//! use specpair::encoder::{EncoderConfig, SpectrumEncoder};
//! use specpair::spectrum::SpectrumBuilder;
//!
//! let encoder = EncoderConfig::default().build(None)?;
//! let spectrum = SpectrumBuilder::new("scan=1")
//!     .precursor(500.25, 2)
//!     .add_peak(175.119, 120.0)
//!     .add_peak(262.151, 80.0)
//!     .build();
//!
//! let features = encoder.encode(&spectrum);
//! assert_eq!(features.len(), encoder.num_features());
//! # Ok::<(), specpair::encoder::EncoderError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`config`]: TOML configuration with defaults for every setting
//! - [`metadata`]: metadata conversion, reading and the dataset split
//! - [`download`]: parallel peak file download
//! - [`pairs`]: positive and negative pair generation
//! - [`spectrum`]: spectrum type, preprocessing, MGF reading
//! - [`encoder`]: feature encoders and feature table export
//! - [`pipeline`]: task graph, runner, schedule and run reports
//! - [`output`]: write-once, atomically renamed output files
//!
//! ## File Formats
//!
//! | File | Columns | Header |
//! |------|---------|--------|
//! | raw library TSV | annotation, charge, filename, mz, scan, ... | yes |
//! | metadata CSV | dataset, filename, scan, sequence, charge, mz | yes |
//! | pair CSV | idx1, idx2 (0-based metadata rows) | no |
//! | feature CSV | identifier, feature names | yes |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod download;
pub mod encoder;
pub mod metadata;
pub mod output;
pub mod pairs;
pub mod pipeline;
pub mod spectrum;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::download::{download_peaks, DownloadConfig, DownloadStats, Transport, WgetTransport};
    pub use crate::encoder::{
        CompositeEncoder, Encoder, EncoderConfig, FragmentEncoder, PrecursorEncoder,
        ReferenceSpectraEncoder, SpectrumEncoder,
    };
    pub use crate::metadata::{convert_metadata, read_metadata, split_metadata, MetadataRow, SplitConfig};
    pub use crate::output::StepOutcome;
    pub use crate::pairs::{generate_pairs_negative, generate_pairs_positive, Pair};
    pub use crate::pipeline::{ExternalStep, Pipeline, RunReport, Schedule, SkipExternal, TaskGraph, TaskId};
    pub use crate::spectrum::{Spectrum, SpectrumBuilder};
}
