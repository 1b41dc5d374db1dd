use std::path::Path;

use log::{debug, info};

use crate::metadata::{read_metadata, MetadataRow};
use crate::output::{write_if_absent, StepOutcome};

use super::{write_pair, Pair, PairError};

fn check_tolerance(mz_tolerance: f64) -> Result<(), PairError> {
    if mz_tolerance.is_finite() && mz_tolerance >= 0.0 {
        Ok(())
    } else {
        Err(PairError::InvalidTolerance(mz_tolerance))
    }
}

/// Call `visit` for every negative pair.
///
/// Rows are ordered by (charge, m/z). For each row the scan moves forward
/// while the m/z difference stays within `mz_tolerance`, emitting the pair
/// whenever the peptide sequences differ, and stops at the first row outside
/// the tolerance. The scan is not reset at charge boundaries: the last rows of
/// one charge can pair with the first rows of the next when their m/z values
/// are close enough.
pub fn visit_negative_pairs<F, E>(
    rows: &[MetadataRow],
    mz_tolerance: f64,
    mut visit: F,
) -> Result<(), E>
where
    F: FnMut(usize, usize) -> Result<(), E>,
{
    let mut order: Vec<&MetadataRow> = rows.iter().collect();
    order.sort_by(|a, b| a.charge.cmp(&b.charge).then(a.mz.total_cmp(&b.mz)));

    for (i, first) in order.iter().enumerate() {
        for second in &order[i + 1..] {
            // NaN m/z never counts as within tolerance
            let within = (second.mz - first.mz).abs() <= mz_tolerance;
            if !within {
                break;
            }
            if first.sequence != second.sequence {
                visit(first.row_num, second.row_num)?;
            }
        }
    }
    Ok(())
}

/// All negative pairs of the given rows.
pub fn negative_pairs(rows: &[MetadataRow], mz_tolerance: f64) -> Result<Vec<Pair>, PairError> {
    check_tolerance(mz_tolerance)?;
    let mut pairs = Vec::new();
    visit_negative_pairs(rows, mz_tolerance, |a, b| -> Result<(), PairError> {
        pairs.push((a, b));
        Ok(())
    })?;
    Ok(pairs)
}

/// Generate the negative pair file for a metadata CSV.
///
/// Does nothing if `pairs_path` already exists.
pub fn generate_pairs_negative<P, Q>(
    metadata_path: P,
    pairs_path: Q,
    mz_tolerance: f64,
) -> Result<StepOutcome, PairError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    check_tolerance(mz_tolerance)?;
    let pairs_path = pairs_path.as_ref();
    if pairs_path.is_file() {
        info!("Negative pairs {} exist, skipping", pairs_path.display());
        return Ok(StepOutcome::Skipped);
    }

    info!("Generate negative pair indexes (m/z tolerance {})", mz_tolerance);
    let rows = read_metadata(metadata_path)?;
    debug!("Save negative pair indexes to {}", pairs_path.display());
    let mut count = 0usize;
    let outcome = write_if_absent(pairs_path, |writer| {
        visit_negative_pairs(&rows, mz_tolerance, |a, b| {
            count += 1;
            write_pair(writer, a, b)
        })
        .map_err(PairError::from)
    })?;
    debug!("Wrote {} negative pairs", count);
    Ok(outcome)
}
