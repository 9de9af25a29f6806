//! Group key derivation.
//!
//! A group key is built from a fixed, ordered list of column indices. With the
//! default [`KeyEncoding::Concatenated`] the selected fields are joined with no
//! separator, so `("a", "bc")` and `("ab", "c")` land in the same group.
//! [`KeyEncoding::LengthPrefixed`] avoids that collision at the cost of less
//! readable unit names.

use crate::error::{DelimitedError, Result};
use crate::record::Row;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// How selected fields are combined into a key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEncoding {
    /// Plain concatenation in column order.
    #[default]
    Concatenated,
    /// Each field written as `<byte length>_<value>`.
    LengthPrefixed,
}

/// Ordered group-column selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupColumns {
    columns: Vec<usize>,
    encoding: KeyEncoding,
}

impl GroupColumns {
    /// # Errors
    /// [`DelimitedError::NoGroupColumns`] when `columns` is empty.
    pub fn new(columns: impl Into<Vec<usize>>) -> Result<Self> {
        let columns = columns.into();
        if columns.is_empty() {
            return Err(DelimitedError::NoGroupColumns);
        }
        Ok(Self {
            columns,
            encoding: KeyEncoding::default(),
        })
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    #[must_use]
    pub fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    /// Derive the group key of `row`.
    ///
    /// # Errors
    /// [`DelimitedError::ColumnOutOfRange`] if any configured column is past
    /// the end of the record.
    pub fn key_for<R: Row + ?Sized>(&self, row: &R) -> Result<String> {
        let mut key = String::new();
        for &column in &self.columns {
            let value = row
                .field(column)
                .ok_or_else(|| DelimitedError::ColumnOutOfRange {
                    column,
                    fields: row.field_count(),
                })?;
            match self.encoding {
                KeyEncoding::Concatenated => key.push_str(value),
                KeyEncoding::LengthPrefixed => {
                    // Writing to a String cannot fail.
                    let _ = write!(key, "{}_{}", value.len(), value);
                }
            }
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_in_column_order() {
        let cols = GroupColumns::new(vec![2, 0]).unwrap();
        assert_eq!(cols.key_for(&["a", "b", "c"]).unwrap(), "ca");
    }

    #[test]
    fn concatenation_collides_on_shifted_boundaries() {
        let cols = GroupColumns::new(vec![0, 1]).unwrap();
        assert_eq!(cols.key_for(&["a", "bc"]).unwrap(), "abc");
        assert_eq!(cols.key_for(&["ab", "c"]).unwrap(), "abc");
    }

    #[test]
    fn length_prefix_separates_shifted_boundaries() {
        let cols = GroupColumns::new(vec![0, 1])
            .unwrap()
            .with_encoding(KeyEncoding::LengthPrefixed);
        let k1 = cols.key_for(&["a", "bc"]).unwrap();
        let k2 = cols.key_for(&["ab", "c"]).unwrap();
        assert_eq!(k1, "1_a2_bc");
        assert_eq!(k2, "2_ab1_c");
        assert_ne!(k1, k2);
    }

    #[test]
    fn out_of_range_column_is_an_error() {
        let cols = GroupColumns::new(vec![0, 3]).unwrap();
        match cols.key_for(&["a", "b"]) {
            Err(DelimitedError::ColumnOutOfRange { column, fields }) => {
                assert_eq!(column, 3);
                assert_eq!(fields, 2);
            }
            other => panic!("expected ColumnOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn empty_column_list_is_rejected() {
        assert!(matches!(
            GroupColumns::new(Vec::<usize>::new()),
            Err(DelimitedError::NoGroupColumns)
        ));
    }

    #[test]
    fn repeated_columns_repeat_the_value() {
        let cols = GroupColumns::new(vec![1, 1]).unwrap();
        assert_eq!(cols.key_for(&vec!["x".to_string(), "y".to_string()]).unwrap(), "yy");
    }
}
