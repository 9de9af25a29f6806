//! Mock I/O helpers: temporary delimited files and quick decoding.

use crate::cancel::Cancellation;
use crate::io::{Reader, Writer};
use crate::options::{ReaderOptions, WriterOptions};
use crate::record::Row;
use std::path::Path;
use tempfile::NamedTempFile;

/// A temporary delimited file that is deleted when dropped.
pub struct TempDelimitedFile {
    file: NamedTempFile,
}

impl TempDelimitedFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write `rows` to a fresh temporary file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```
/// use delimited::testing::mock_delimited_file;
/// use delimited::WriterOptions;
///
/// let file = mock_delimited_file(&[vec!["a", "1"], vec!["b", "2"]], &WriterOptions::tab()).unwrap();
/// assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "a\t1\nb\t2\n");
/// ```
pub fn mock_delimited_file<R: Row>(
    rows: &[R],
    options: &WriterOptions,
) -> anyhow::Result<TempDelimitedFile> {
    let file = tempfile::Builder::new().suffix(".txt").tempfile()?;
    let mut writer = Writer::new(file.reopen()?, options);
    for row in rows {
        writer.write(row)?;
    }
    writer.flush()?;
    Ok(TempDelimitedFile { file })
}

/// Decode `bytes` into owned rows.
///
/// # Errors
///
/// Returns the decode error, if any.
pub fn parse_rows(bytes: &[u8], options: &ReaderOptions) -> anyhow::Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    Reader::new(bytes, options).each_row(&Cancellation::new(), |r| -> anyhow::Result<()> {
        rows.push(r.iter().map(str::to_string).collect());
        Ok(())
    })?;
    Ok(rows)
}
