//! Error types shared by the grouping writer, the backing stores and the codec.

use std::fmt;
use std::io;

/// Convenience alias used throughout the crate.
pub type Result<T, E = DelimitedError> = std::result::Result<T, E>;

/// Broad classification of a [`DelimitedError`].
///
/// Callers that want a retry policy usually only care about this, not the
/// individual variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The group-column configuration does not fit the data.
    Configuration,
    /// A storage unit or the backing area could not be created, opened, listed or removed.
    Storage,
    /// A record could not be decoded or encoded.
    Codec,
    /// Streaming a storage unit into the output sink, or flushing it, failed.
    Copy,
}

/// Storage operation that failed, carried by [`DelimitedError::Storage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    CreateArea,
    Open,
    Read,
    List,
    Remove,
    Destroy,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageOp::CreateArea => "create backing area",
            StorageOp::Open => "open unit",
            StorageOp::Read => "read unit",
            StorageOp::List => "list units",
            StorageOp::Remove => "remove unit",
            StorageOp::Destroy => "remove backing area",
        };
        f.write_str(s)
    }
}

/// Errors produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum DelimitedError {
    /// A configured group column does not exist in the record.
    #[error("group column {column} out of range for record with {fields} fields")]
    ColumnOutOfRange { column: usize, fields: usize },

    /// The group-column list is empty.
    #[error("at least one group column is required")]
    NoGroupColumns,

    /// Backing-area or storage-unit failure.
    #[error("storage error: {op} {unit:?}: {source}")]
    Storage {
        op: StorageOp,
        unit: String,
        #[source]
        source: io::Error,
    },

    /// Malformed input or a failed record write.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The encoder bound to a unit could not flush its buffer.
    #[error("failed to flush unit {unit:?}: {source}")]
    Flush {
        unit: String,
        #[source]
        source: io::Error,
    },

    /// Copying a unit into the merge output failed.
    #[error("failed to copy unit {unit:?} to output: {source}")]
    Copy {
        unit: String,
        #[source]
        source: io::Error,
    },

    /// The merge output could not be flushed after all units were copied.
    #[error("failed to flush merge output: {0}")]
    OutputFlush(#[source] io::Error),
}

impl DelimitedError {
    pub(crate) fn storage(op: StorageOp, unit: impl Into<String>, source: io::Error) -> Self {
        DelimitedError::Storage {
            op,
            unit: unit.into(),
            source,
        }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DelimitedError::ColumnOutOfRange { .. } | DelimitedError::NoGroupColumns => {
                ErrorKind::Configuration
            }
            DelimitedError::Storage { .. } => ErrorKind::Storage,
            DelimitedError::Csv(_) | DelimitedError::Flush { .. } => ErrorKind::Codec,
            DelimitedError::Copy { .. } | DelimitedError::OutputFlush(_) => ErrorKind::Copy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_every_variant() {
        let io = || io::Error::other("boom");
        assert_eq!(
            DelimitedError::ColumnOutOfRange { column: 3, fields: 2 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(DelimitedError::NoGroupColumns.kind(), ErrorKind::Configuration);
        assert_eq!(
            DelimitedError::storage(StorageOp::Open, "a", io()).kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            DelimitedError::Flush { unit: "a".into(), source: io() }.kind(),
            ErrorKind::Codec
        );
        assert_eq!(
            DelimitedError::Copy { unit: "a".into(), source: io() }.kind(),
            ErrorKind::Copy
        );
        assert_eq!(DelimitedError::OutputFlush(io()).kind(), ErrorKind::Copy);
    }

    #[test]
    fn display_names_column_and_width() {
        let msg = DelimitedError::ColumnOutOfRange { column: 4, fields: 2 }.to_string();
        assert_eq!(msg, "group column 4 out of range for record with 2 fields");
        let msg = DelimitedError::storage(StorageOp::Remove, "k", io::Error::other("x")).to_string();
        assert!(msg.contains("remove unit \"k\""));
    }
}
