use super::*;
use crate::metadata::{read_metadata_from, MetadataRow};
use crate::output::StepOutcome;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use tempfile::tempdir;

fn row(row_num: usize, sequence: &str, charge: u32, mz: f64) -> MetadataRow {
    MetadataRow {
        dataset: "MSV000001".to_string(),
        filename: "run.mzML".to_string(),
        scan: row_num as i64,
        sequence: sequence.to_string(),
        charge,
        mz,
        row_num,
    }
}

fn rows(specs: &[(&str, u32, f64)]) -> Vec<MetadataRow> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(sequence, charge, mz))| row(i, sequence, charge, mz))
        .collect()
}

const EXAMPLE_CSV: &str = "dataset,filename,scan,sequence,charge,mz
MSV000001,run.mzML,1,AB,2,500.0
MSV000001,run.mzML,2,AB,2,500.0
MSV000001,run.mzML,3,CD,2,500.05
";

#[test]
fn test_worked_example() {
    let rows = read_metadata_from(EXAMPLE_CSV.as_bytes()).unwrap();

    let negative: HashSet<Pair> = negative_pairs(&rows, 0.1).unwrap().into_iter().collect();
    assert_eq!(negative, HashSet::from([(0, 2), (1, 2)]));

    // The single CD row forms its own group and contributes an identity pair
    let positive = positive_pairs(&rows);
    assert_eq!(positive, vec![(0, 0), (0, 1), (1, 1), (2, 2)]);
}

#[test]
fn test_positive_groups_in_first_seen_order() {
    let rows = rows(&[("B", 2, 1.0), ("A", 2, 2.0), ("B", 2, 3.0), ("B", 3, 4.0)]);
    let pairs = positive_pairs(&rows);
    assert_eq!(pairs, vec![(0, 0), (0, 2), (2, 2), (1, 1), (3, 3)]);
}

#[test]
fn test_positive_separates_charges() {
    let rows = rows(&[("A", 2, 1.0), ("A", 3, 1.0)]);
    assert_eq!(positive_pairs(&rows), vec![(0, 0), (1, 1)]);
}

#[test]
fn test_negative_uses_original_row_numbers() {
    // Sorted by m/z the rows are 2, 0, 1
    let rows = rows(&[("A", 2, 500.2), ("B", 2, 500.3), ("C", 2, 500.1)]);
    let pairs = negative_pairs(&rows, 0.15).unwrap();
    assert_eq!(pairs, vec![(2, 0), (0, 1)]);
}

#[test]
fn test_negative_skips_same_sequence_but_keeps_scanning() {
    let rows = rows(&[("A", 2, 500.0), ("A", 2, 500.01), ("B", 2, 500.02)]);
    let pairs = negative_pairs(&rows, 0.05).unwrap();
    assert_eq!(pairs, vec![(0, 2), (1, 2)]);
}

#[test]
fn test_negative_scan_crosses_charge_boundary() {
    // Highest charge-2 m/z sits next to the lowest charge-3 m/z
    let rows = rows(&[("A", 2, 400.0), ("B", 2, 600.0), ("C", 3, 600.05), ("D", 3, 900.0)]);
    let pairs = negative_pairs(&rows, 0.1).unwrap();
    assert_eq!(pairs, vec![(1, 2)]);
}

#[test]
fn test_negative_nan_mz_ends_scan() {
    let isolated = rows(&[("AB", 2, 500.0), ("CD", 2, f64::NAN), ("EF", 2, 900.0)]);
    let pairs = negative_pairs(&isolated, 0.1).unwrap();
    assert!(pairs.is_empty(), "unexpected pairs {:?}", pairs);

    let mixed = rows(&[("AB", 2, f64::NAN), ("CD", 2, f64::NAN), ("EF", 2, 500.05), ("GH", 2, 500.0)]);
    assert_eq!(negative_pairs(&mixed, 0.1).unwrap(), vec![(3, 2)]);
}

#[test]
fn test_negative_rejects_bad_tolerance() {
    let rows = rows(&[("A", 2, 500.0)]);
    assert!(matches!(negative_pairs(&rows, -1.0), Err(PairError::InvalidTolerance(_))));
    assert!(matches!(negative_pairs(&rows, f64::NAN), Err(PairError::InvalidTolerance(_))));
}

#[test]
fn test_generate_pair_files_are_idempotent() {
    let dir = tempdir().unwrap();
    let metadata = dir.path().join("metadata.csv");
    fs::write(&metadata, EXAMPLE_CSV).unwrap();
    let (pos_path, neg_path) = pair_paths(&metadata);

    assert_eq!(generate_pairs_positive(&metadata, &pos_path).unwrap(), StepOutcome::Written);
    assert_eq!(
        generate_pairs_negative(&metadata, &neg_path, 0.1).unwrap(),
        StepOutcome::Written
    );
    assert_eq!(fs::read_to_string(&pos_path).unwrap(), "0,0\n0,1\n1,1\n2,2\n");
    assert_eq!(fs::read_to_string(&neg_path).unwrap(), "0,2\n1,2\n");

    let pos_before = fs::read(&pos_path).unwrap();
    let neg_before = fs::read(&neg_path).unwrap();
    fs::write(&metadata, EXAMPLE_CSV.replace("AB", "XY")).unwrap();

    assert_eq!(generate_pairs_positive(&metadata, &pos_path).unwrap(), StepOutcome::Skipped);
    assert_eq!(
        generate_pairs_negative(&metadata, &neg_path, 0.1).unwrap(),
        StepOutcome::Skipped
    );
    assert_eq!(fs::read(&pos_path).unwrap(), pos_before);
    assert_eq!(fs::read(&neg_path).unwrap(), neg_before);
}

#[test]
fn test_pair_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pairs.csv");
    let pairs = vec![(0, 3), (7, 1)];
    write_pairs(fs::File::create(&path).unwrap(), &pairs).unwrap();
    assert_eq!(read_pairs(&path).unwrap(), pairs);
}

#[test]
fn test_pair_paths() {
    let (pos, neg) = pair_paths("/data/metadata_train.csv");
    assert_eq!(pos, std::path::PathBuf::from("/data/metadata_train_pairs_pos.csv"));
    assert_eq!(neg, std::path::PathBuf::from("/data/metadata_train_pairs_neg.csv"));
}

fn arb_rows() -> impl Strategy<Value = Vec<MetadataRow>> {
    prop::collection::vec((0usize..4, 1u32..4, 0u32..200), 0..60).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (seq, charge, mz))| {
                row(i, ["AA", "BB", "CC", "DD"][seq], charge, 400.0 + f64::from(mz) * 0.01)
            })
            .collect()
    })
}

proptest! {
    /// Every (sequence, charge) group of size G yields G * (G + 1) / 2 pairs
    #[test]
    fn prop_positive_group_counts(rows in arb_rows()) {
        let pairs = positive_pairs(&rows);

        let mut sizes: HashMap<(String, u32), usize> = HashMap::new();
        for r in &rows {
            *sizes.entry((r.sequence.clone(), r.charge)).or_insert(0) += 1;
        }
        let expected: usize = sizes.values().map(|g| g * (g + 1) / 2).sum();
        prop_assert_eq!(pairs.len(), expected);

        let self_pairs = pairs.iter().filter(|(a, b)| a == b).count();
        prop_assert_eq!(self_pairs, rows.len());
        for (a, b) in pairs {
            prop_assert_eq!(&rows[a].sequence, &rows[b].sequence);
            prop_assert_eq!(rows[a].charge, rows[b].charge);
        }
    }

    /// Negative pairs differ in sequence, lie within tolerance, and every such
    /// pair inside one charge is found
    #[test]
    fn prop_negative_pairs_sound_and_complete(rows in arb_rows(), tolerance in 0.0f64..0.5) {
        let pairs = negative_pairs(&rows, tolerance).unwrap();
        let found: HashSet<(usize, usize)> = pairs
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        prop_assert_eq!(found.len(), pairs.len());

        for &(a, b) in &pairs {
            prop_assert_ne!(&rows[a].sequence, &rows[b].sequence);
            prop_assert!((rows[a].mz - rows[b].mz).abs() <= tolerance);
        }
        for a in 0..rows.len() {
            for b in a + 1..rows.len() {
                if rows[a].charge == rows[b].charge
                    && rows[a].sequence != rows[b].sequence
                    && (rows[a].mz - rows[b].mz).abs() <= tolerance
                {
                    prop_assert!(found.contains(&(a, b)));
                }
            }
        }
    }
}
