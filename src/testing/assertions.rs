//! Assertions over merged output.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;

/// Concatenated key of `row` for `columns`; `None` if a column is missing.
fn plain_key(row: &[String], columns: &[usize]) -> Option<String> {
    columns
        .iter()
        .map(|&c| row.get(c).map(String::as_str))
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.concat())
}

/// Group keys in the order their runs appear in `rows`.
///
/// Consecutive rows with the same key form one run.
///
/// # Panics
///
/// Panics if a row is too short for `columns`.
#[must_use]
pub fn group_runs(rows: &[Vec<String>], columns: &[usize]) -> Vec<String> {
    let mut runs: Vec<String> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let key = plain_key(row, columns)
            .unwrap_or_else(|| panic!("row {i} has no column in {columns:?}: {row:?}"));
        if runs.last() != Some(&key) {
            runs.push(key);
        }
    }
    runs
}

/// Assert that every group key occupies exactly one contiguous run.
///
/// # Panics
///
/// Panics naming the first key that appears in two separate runs.
pub fn assert_contiguous_groups(rows: &[Vec<String>], columns: &[usize]) {
    let mut seen = HashSet::new();
    for key in group_runs(rows, columns) {
        assert!(
            seen.insert(key.clone()),
            "Group {key:?} appears in more than one run:\n  Rows: {rows:?}"
        );
    }
}

/// Assert that `merged` holds exactly the rows of `written`, and that rows of
/// each group keep their written order.
///
/// # Panics
///
/// Panics if a row is missing, duplicated, or out of order within its group.
pub fn assert_grouped_permutation<T: Debug + PartialEq + Clone>(
    written: &[Vec<T>],
    merged: &[Vec<T>],
    key: impl Fn(&[T]) -> String,
) {
    assert_eq!(
        written.len(),
        merged.len(),
        "Row count mismatch:\n  Written: {written:?}\n  Merged: {merged:?}"
    );
    let mut by_key_written: BTreeMap<String, Vec<&Vec<T>>> = BTreeMap::new();
    for row in written {
        by_key_written.entry(key(row)).or_default().push(row);
    }
    let mut by_key_merged: BTreeMap<String, Vec<&Vec<T>>> = BTreeMap::new();
    for row in merged {
        by_key_merged.entry(key(row)).or_default().push(row);
    }
    assert_eq!(
        by_key_written, by_key_merged,
        "Rows per group differ (content or order)"
    );
}
