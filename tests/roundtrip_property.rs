//! Property-based round-trip tests (proptest).

use proptest::prelude::*;
use std::collections::BTreeSet;

use sscdf::{Array, Matrix, NativeFormat, Reader, Tensor, WriteOptions, Writer};

/// Arbitrary coordinate pattern: dimensions plus a set of unique (row, col)
/// entries within them
fn coo_pattern() -> impl Strategy<Value = (u64, u64, Vec<(u64, u64)>)> {
    (1u64..32, 1u64..32).prop_flat_map(|(nrows, ncols)| {
        let max_entries = ((nrows * ncols) as usize).min(48);
        proptest::collection::btree_set((0..nrows, 0..ncols), 0..=max_entries).prop_map(
            move |coords: BTreeSet<(u64, u64)>| (nrows, ncols, coords.into_iter().collect()),
        )
    })
}

fn all_formats() -> impl Strategy<Value = NativeFormat> {
    prop_oneof![
        Just(NativeFormat::Csr),
        Just(NativeFormat::Csc),
        Just(NativeFormat::HyperCsr),
        Just(NativeFormat::HyperCsc),
        Just(NativeFormat::CooR),
        Just(NativeFormat::CooC),
    ]
}

proptest! {
    #[test]
    fn roundtrip_preserves_matrix(
        (nrows, ncols, coords) in coo_pattern(),
        format in all_formats(),
        seed in 0i64..1000,
    ) {
        let rows: Vec<u64> = coords.iter().map(|&(r, _)| r).collect();
        let cols: Vec<u64> = coords.iter().map(|&(_, c)| c).collect();
        let values: Vec<i64> = (0..rows.len() as i64).map(|i| i * 31 + seed).collect();
        let m = Tensor::Matrix(
            Matrix::from_entries(nrows, ncols, rows, cols, Array::Int64(values)).unwrap(),
        );

        let mut writer = Writer::in_memory();
        writer.write_with(&m, &WriteOptions::default().format(format)).unwrap();
        let bytes = writer.finish().unwrap();
        let back = Reader::from_bytes(&bytes).unwrap().read(None).unwrap();
        prop_assert_eq!(back, m);
    }

    #[test]
    fn iso_matrices_collapse_and_reexpand(
        (nrows, ncols, coords) in coo_pattern(),
        value in -100i64..100,
    ) {
        prop_assume!(!coords.is_empty());
        let rows: Vec<u64> = coords.iter().map(|&(r, _)| r).collect();
        let cols: Vec<u64> = coords.iter().map(|&(_, c)| c).collect();
        let values = vec![value; rows.len()];
        let m = Tensor::Matrix(
            Matrix::from_entries(nrows, ncols, rows, cols, Array::Int64(values)).unwrap(),
        );

        let mut writer = Writer::in_memory();
        writer.write(&m).unwrap();
        let bytes = writer.finish().unwrap();
        let reader = Reader::from_bytes(&bytes).unwrap();
        prop_assert!(reader.info(None).unwrap().iso_value.is_some());
        prop_assert_eq!(reader.read(None).unwrap(), m);
    }
}
