//! Decoder: delimited bytes to records.

use crate::cancel::Cancellation;
use crate::error::{DelimitedError, Result};
use crate::options::ReaderOptions;
use csv::StringRecord;
use std::io::Read;

/// Lenient delimited-record decoder.
///
/// Wraps a [`csv::Reader`] configured from [`ReaderOptions`] and reuses one
/// [`StringRecord`] buffer for every row.
///
/// Fields are text: a record containing bytes that are not valid UTF-8 is a
/// decode error ([`DelimitedError::Csv`]) and ends the pass, rather than being
/// passed through as raw bytes. Group keys name storage units, so they have to
/// be strings anyway.
pub struct Reader<R> {
    inner: csv::Reader<R>,
    record: StringRecord,
}

impl<R: Read> Reader<R> {
    pub fn new(reader: R, options: &ReaderOptions) -> Self {
        Self {
            inner: options.builder().from_reader(reader),
            record: StringRecord::new(),
        }
    }

    /// Read the next record, or `None` at end of input.
    ///
    /// # Errors
    /// Returns [`DelimitedError::Csv`] on malformed input or an I/O failure.
    pub fn read_record(&mut self) -> Result<Option<&StringRecord>> {
        if self.inner.read_record(&mut self.record)? {
            Ok(Some(&self.record))
        } else {
            Ok(None)
        }
    }

    /// Push every remaining record into `f`.
    ///
    /// Stops cleanly at end of input. `cancel` is checked after each record is
    /// read; once it is set the pending record is dropped and the call returns
    /// `Ok` with the number of records delivered so far. A decode error or an
    /// error returned by `f` aborts the pass.
    ///
    /// # Errors
    /// Decode errors converted into `E`, or the first error returned by `f`.
    pub fn each_row<F, E>(&mut self, cancel: &Cancellation, mut f: F) -> Result<u64, E>
    where
        F: FnMut(&StringRecord) -> Result<(), E>,
        E: From<DelimitedError>,
    {
        let mut delivered = 0u64;
        loop {
            match self.inner.read_record(&mut self.record) {
                Ok(true) => {}
                Ok(false) => return Ok(delivered),
                Err(e) => return Err(DelimitedError::from(e).into()),
            }
            if cancel.is_cancelled() {
                log::debug!("decoder cancelled after {delivered} records");
                return Ok(delivered);
            }
            f(&self.record)?;
            delivered += 1;
        }
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}
