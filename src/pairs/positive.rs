use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};

use crate::metadata::{read_metadata, MetadataRow};
use crate::output::{write_if_absent, StepOutcome};

use super::{write_pair, Pair, PairError};

/// Call `visit` for every positive pair.
///
/// Rows are grouped by (sequence, charge) in first-seen order and every group
/// yields all index combinations with replacement, `(i, j)` with `i <= j` in
/// group order.
pub fn visit_positive_pairs<F, E>(rows: &[MetadataRow], mut visit: F) -> Result<(), E>
where
    F: FnMut(usize, usize) -> Result<(), E>,
{
    let mut group_index: HashMap<(&str, u32), usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for row in rows {
        let key = (row.sequence.as_str(), row.charge);
        let index = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(row.row_num);
    }

    for group in &groups {
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i..] {
                visit(a, b)?;
            }
        }
    }
    Ok(())
}

/// All positive pairs of the given rows.
pub fn positive_pairs(rows: &[MetadataRow]) -> Vec<Pair> {
    let mut pairs = Vec::new();
    let _ = visit_positive_pairs(rows, |a, b| -> Result<(), std::convert::Infallible> {
        pairs.push((a, b));
        Ok(())
    });
    pairs
}

/// Generate the positive pair file for a metadata CSV.
///
/// Does nothing if `pairs_path` already exists.
pub fn generate_pairs_positive<P, Q>(metadata_path: P, pairs_path: Q) -> Result<StepOutcome, PairError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let pairs_path = pairs_path.as_ref();
    if pairs_path.is_file() {
        info!("Positive pairs {} exist, skipping", pairs_path.display());
        return Ok(StepOutcome::Skipped);
    }

    info!("Generate positive pair indexes");
    let rows = read_metadata(metadata_path)?;
    debug!("Save positive pair indexes to {}", pairs_path.display());
    let mut count = 0usize;
    let outcome = write_if_absent(pairs_path, |writer| {
        visit_positive_pairs(&rows, |a, b| {
            count += 1;
            write_pair(writer, a, b)
        })
        .map_err(PairError::from)
    })?;
    debug!("Wrote {} positive pairs", count);
    Ok(outcome)
}
