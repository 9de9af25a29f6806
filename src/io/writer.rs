//! Encoder: records to delimited bytes.

use crate::error::Result;
use crate::options::WriterOptions;
use crate::record::Row;
use std::io::Write;

/// Buffered delimited-record encoder.
///
/// Records are buffered inside the wrapped [`csv::Writer`] until
/// [`flush`](Self::flush) is called or the writer is dropped. Dropping flushes
/// on a best-effort basis and discards errors, so callers that care about the
/// final bytes must flush explicitly.
///
/// After the underlying writer has failed once, nothing more is written to it.
/// A failed flush may have pushed part of the buffer already, and the `csv`
/// buffer still holds all of it; writing it again would duplicate that part.
pub struct Writer<W: Write> {
    inner: csv::Writer<Guarded<W>>,
}

/// Stops forwarding writes after the first error.
struct Guarded<W> {
    inner: W,
    failed: bool,
}

impl<W: Write> Guarded<W> {
    fn check(&self) -> std::io::Result<()> {
        if self.failed {
            Err(std::io::Error::other("writer disabled after an earlier failure"))
        } else {
            Ok(())
        }
    }
}

impl<W: Write> Write for Guarded<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.check()?;
        let written = self.inner.write(buf);
        self.failed = written.is_err();
        written
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.check()?;
        let flushed = self.inner.flush();
        self.failed = flushed.is_err();
        flushed
    }
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W, options: &WriterOptions) -> Self {
        let guarded = Guarded {
            inner: writer,
            failed: false,
        };
        Self {
            inner: options.builder().from_writer(guarded),
        }
    }

    /// Whether the underlying writer has failed. A failed writer rejects
    /// every later write and flush.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.inner.get_ref().failed
    }

    /// Encode one record.
    ///
    /// # Errors
    /// [`DelimitedError::Csv`] if the record cannot be written.
    pub fn write<R: Row + ?Sized>(&mut self, row: &R) -> Result<()> {
        self.inner.write_record(row.fields())?;
        Ok(())
    }

    /// Push buffered bytes to the underlying writer.
    ///
    /// # Errors
    /// The I/O error from the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    /// The I/O error of the final flush.
    pub fn into_inner(self) -> std::io::Result<W> {
        self.inner
            .into_inner()
            .map(|guarded| guarded.inner)
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WriterOptions;

    /// Accepts `limit` bytes, fails one write, then accepts everything.
    struct Hiccup {
        bytes: Vec<u8>,
        limit: usize,
        tripped: bool,
    }

    impl Write for Hiccup {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.tripped && self.bytes.len() >= self.limit {
                self.tripped = true;
                return Err(std::io::Error::other("disk full"));
            }
            let n = if self.tripped {
                buf.len()
            } else {
                buf.len().min(self.limit - self.bytes.len())
            };
            self.bytes.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn encode(rows: &[Vec<&str>], options: &WriterOptions) -> String {
        let mut w = Writer::new(Vec::new(), options);
        for r in rows {
            w.write(r).unwrap();
        }
        String::from_utf8(w.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn writes_newline_terminated_records() {
        let out = encode(&[vec!["a", "1"], vec!["b"]], &WriterOptions::comma());
        assert_eq!(out, "a,1\nb\n");
    }

    #[test]
    fn quotes_fields_containing_the_delimiter() {
        let out = encode(&[vec!["a b", "c"]], &WriterOptions::space());
        assert_eq!(out, "\"a b\" c\n");
        let out = encode(&[vec!["a,b", "c"]], &WriterOptions::tab());
        assert_eq!(out, "a,b\tc\n");
    }

    #[test]
    fn buffered_until_flush() {
        let mut sink = Vec::new();
        {
            let mut w = Writer::new(&mut sink, &WriterOptions::comma());
            w.write(&["x", "y"]).unwrap();
            w.flush().unwrap();
        }
        assert_eq!(sink, b"x,y\n");
    }

    #[test]
    fn failed_flush_writes_nothing_more() {
        let mut sink = Hiccup {
            bytes: Vec::new(),
            limit: 3,
            tripped: false,
        };
        {
            let mut w = Writer::new(&mut sink, &WriterOptions::comma());
            w.write(&["a", "1"]).unwrap();
            w.write(&["a", "2"]).unwrap();
            assert!(w.flush().is_err());
            assert!(w.is_failed());
            assert!(w.flush().is_err());
        }
        // Dropping the encoder must not push the buffer a second time.
        assert_eq!(sink.bytes, b"a,1");
    }
}
