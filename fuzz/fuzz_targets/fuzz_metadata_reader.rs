#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use specpair::pairs::{negative_pairs, positive_pairs};

fuzz_target!(|data: &[u8]| {
    let rows = match specpair::metadata::read_metadata_from(Cursor::new(data)) {
        Ok(rows) => rows,
        Err(_) => return,
    };

    // Every emitted index must refer to a parsed row
    for (a, b) in positive_pairs(&rows) {
        assert!(a <= b && b < rows.len());
    }
    if let Ok(pairs) = negative_pairs(&rows, 0.1) {
        for (a, b) in pairs {
            assert!(a < rows.len() && b < rows.len());
        }
    }
});
