//! # Training Pair Generation
//!
//! Builds the index pairs a siamese embedding model trains on. Pairs refer to
//! metadata rows by their 0-based position in the metadata CSV.
//!
//! - **Positive pairs**: both matches share peptide sequence and precursor
//!   charge. Identity pairs are included, so a group of `G` matches yields
//!   `G * (G + 1) / 2` pairs.
//! - **Negative pairs**: the peptide sequences differ while the precursor m/z
//!   values lie within a tolerance of each other.
//!
//! Pair files hold one `idx1,idx2` line per pair and no header. Like every
//! other pipeline output they are written once: an existing pair file is
//! treated as up to date.

mod error;
mod negative;
mod positive;

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

pub use error::PairError;
pub use negative::{generate_pairs_negative, negative_pairs, visit_negative_pairs};
pub use positive::{generate_pairs_positive, positive_pairs, visit_positive_pairs};

/// A pair of metadata row numbers.
pub type Pair = (usize, usize);

/// Default pair file names next to a metadata file:
/// `metadata_train.csv` → `metadata_train_pairs_pos.csv` and
/// `metadata_train_pairs_neg.csv`.
pub fn pair_paths<P: AsRef<Path>>(metadata_path: P) -> (PathBuf, PathBuf) {
    let path = metadata_path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (
        path.with_file_name(format!("{}_pairs_pos.csv", stem)),
        path.with_file_name(format!("{}_pairs_neg.csv", stem)),
    )
}

fn write_pair<W: Write>(writer: &mut W, a: usize, b: usize) -> std::io::Result<()> {
    writeln!(writer, "{},{}", a, b)
}

/// Write pairs as header-less `idx1,idx2` lines.
pub fn write_pairs<W: Write>(mut writer: W, pairs: &[Pair]) -> Result<(), PairError> {
    for &(a, b) in pairs {
        write_pair(&mut writer, a, b)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a pair file.
pub fn read_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<Pair>, PairError> {
    read_pairs_from(BufReader::new(File::open(path)?))
}

/// Read pairs from any header-less two-column CSV source.
pub fn read_pairs_from<R: Read>(reader: R) -> Result<Vec<Pair>, PairError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut pairs = Vec::new();
    for record in csv_reader.deserialize::<Pair>() {
        pairs.push(record?);
    }
    Ok(pairs)
}
