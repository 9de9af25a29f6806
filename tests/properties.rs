//! Property tests for grouping, ordering and completeness of merged output.

use delimited::testing::{assert_contiguous_groups, assert_grouped_permutation, group_runs, parse_rows};
use delimited::{KeyEncoding, MemoryStore, MultiWriter, MultiWriterConfig, ReaderOptions};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(("[a-c]{1,2}", "[a-z0-9 ]{0,4}"), 0..40).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (k, v))| vec![k, v, i.to_string()])
            .collect()
    })
}

fn split_merge(rows: &[Vec<String>], config: &MultiWriterConfig) -> Vec<u8> {
    let mut w = MultiWriter::with_store(config, MemoryStore::new()).unwrap();
    for row in rows {
        w.write(row).unwrap();
    }
    let mut out = Vec::new();
    w.merge(&mut out).unwrap();
    w.close().unwrap();
    out
}

proptest! {
    #[test]
    fn merged_output_is_a_grouped_permutation(rows in rows_strategy()) {
        let out = split_merge(&rows, &MultiWriterConfig::new(vec![0]));
        let merged = parse_rows(&out, &ReaderOptions::comma()).unwrap();

        assert_grouped_permutation(&rows, &merged, |r| r[0].clone());
        assert_contiguous_groups(&merged, &[0]);

        let runs = group_runs(&merged, &[0]);
        let mut sorted = runs.clone();
        sorted.sort();
        prop_assert_eq!(runs, sorted);
    }

    #[test]
    fn every_record_lands_exactly_once(rows in rows_strategy()) {
        let out = split_merge(&rows, &MultiWriterConfig::new(vec![0, 1]));
        let merged = parse_rows(&out, &ReaderOptions::comma()).unwrap();
        let written: BTreeSet<_> = rows.iter().map(|r| r[2].clone()).collect();
        let seen: Vec<_> = merged.iter().map(|r| r[2].clone()).collect();
        prop_assert_eq!(seen.len(), rows.len());
        prop_assert_eq!(seen.into_iter().collect::<BTreeSet<_>>(), written);
    }

    #[test]
    fn length_prefixed_units_match_distinct_column_tuples(
        pairs in prop::collection::vec(("[ab]{1,2}", "[ab]{1,2}"), 1..30)
    ) {
        let store = MemoryStore::new();
        let view = store.clone();
        let config = MultiWriterConfig::new(vec![0, 1]).with_key_encoding(KeyEncoding::LengthPrefixed);
        let mut w = MultiWriter::with_store(&config, store).unwrap();
        for (a, b) in &pairs {
            w.write(&[a.as_str(), b.as_str()]).unwrap();
        }
        w.flush().unwrap();
        let distinct: BTreeSet<_> = pairs.iter().cloned().collect();
        prop_assert_eq!(view.snapshot().unwrap().len(), distinct.len());
    }
}
