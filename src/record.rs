//! Field access over records.
//!
//! A record is an ordered sequence of text fields. [`Row`] lets the grouping
//! writer and the encoder accept the shapes callers already have: decoded
//! [`csv::StringRecord`]s, `Vec<String>`, or plain slices of `&str`.

use csv::StringRecord;

/// An ordered sequence of text fields.
pub trait Row {
    /// Number of fields in the record.
    fn field_count(&self) -> usize;

    /// Field at `index`, or `None` when the record is shorter.
    fn field(&self, index: usize) -> Option<&str>;

    /// All fields in order.
    fn fields(&self) -> impl Iterator<Item = &str> {
        (0..self.field_count()).filter_map(move |i| self.field(i))
    }
}

impl<S: AsRef<str>> Row for [S] {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.get(index).map(AsRef::as_ref)
    }
}

impl<S: AsRef<str>> Row for Vec<S> {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.get(index).map(AsRef::as_ref)
    }
}

impl<S: AsRef<str>, const N: usize> Row for [S; N] {
    fn field_count(&self) -> usize {
        N
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.get(index).map(AsRef::as_ref)
    }
}

impl Row for StringRecord {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.get(index)
    }

    fn fields(&self) -> impl Iterator<Item = &str> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_and_records_agree() {
        let owned = vec!["a".to_string(), "b".to_string()];
        let arr = ["a", "b"];
        let rec = StringRecord::from(vec!["a", "b"]);

        assert_eq!(owned.field_count(), 2);
        assert_eq!(arr.field(1), Some("b"));
        assert_eq!(rec.field(2), None);
        assert_eq!(owned.fields().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(rec.fields().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(arr[..].fields().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
