//! # Spectral Library Metadata
//!
//! This module turns the candidate library TSV of a spectral library build
//! (one row per peptide-spectrum match) into the compact metadata CSV the rest
//! of the pipeline works from, and splits that metadata into train, validation
//! and test partitions.
//!
//! ## Files
//!
//! | File | Columns |
//! |------|---------|
//! | raw library TSV | `annotation`, `charge`, `filename`, `mz`, `scan` (+ others, ignored) |
//! | metadata CSV | `dataset`, `filename`, `scan`, `sequence`, `charge`, `mz` |
//!
//! Row numbers are not stored: a row's position in the metadata CSV is its
//! identity, and pair files refer to rows by that position.

mod convert;
mod error;
mod records;
mod split;


pub use convert::{convert_metadata, read_peak_filenames, split_dataset_filename};
pub use error::MetadataError;
pub use records::{read_metadata, read_metadata_from, write_metadata, MetadataRow, RawPsm};
pub use split::{split_metadata, split_paths, SplitConfig, SplitPaths, SplitStats};
