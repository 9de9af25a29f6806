//! One-call pipeline: decode, group, merge, clean up.

use crate::cancel::Cancellation;
use crate::error::{DelimitedError, Result};
use crate::io::Reader;
use crate::multi_writer::{MergeSummary, MultiWriter};
use crate::options::{MultiWriterConfig, ReaderOptions};
use crate::store::BackingStore;
use std::io::{Read, Write};

/// Totals reported by [`split_and_merge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Records decoded and routed to a group.
    pub records: u64,
    pub merge: MergeSummary,
}

/// Regroup a delimited stream so records sharing a group key are contiguous.
///
/// Records are decoded from `input` with `reader`, routed through a
/// [`MultiWriter`] backed by a temporary directory, merged into `out` (which
/// is flushed) and the directory is removed. If `cancel` fires, the records
/// read so far are still merged.
///
/// # Errors
/// The first decode, grouping, merge or flush error. The backing directory is
/// removed in every case.
pub fn split_and_merge<R, W>(
    input: R,
    reader: &ReaderOptions,
    config: &MultiWriterConfig,
    out: &mut W,
    cancel: &Cancellation,
) -> Result<SplitSummary>
where
    R: Read,
    W: Write + ?Sized,
{
    let writer = MultiWriter::new(config)?;
    drive(writer, input, reader, out, cancel)
}

/// [`split_and_merge`] over a caller-supplied backing area.
///
/// # Errors
/// See [`split_and_merge`].
pub fn split_and_merge_with<S, R, W>(
    store: S,
    input: R,
    reader: &ReaderOptions,
    config: &MultiWriterConfig,
    out: &mut W,
    cancel: &Cancellation,
) -> Result<SplitSummary>
where
    S: BackingStore,
    R: Read,
    W: Write + ?Sized,
{
    let writer = MultiWriter::with_store(config, store)?;
    drive(writer, input, reader, out, cancel)
}

fn drive<S, R, W>(
    mut writer: MultiWriter<S>,
    input: R,
    reader: &ReaderOptions,
    out: &mut W,
    cancel: &Cancellation,
) -> Result<SplitSummary>
where
    S: BackingStore,
    R: Read,
    W: Write + ?Sized,
{
    let outcome = regroup(&mut writer, input, reader, out, cancel);
    let closed = writer.close();
    let summary = outcome?;
    closed?;
    Ok(summary)
}

fn regroup<S, R, W>(
    writer: &mut MultiWriter<S>,
    input: R,
    reader: &ReaderOptions,
    out: &mut W,
    cancel: &Cancellation,
) -> Result<SplitSummary>
where
    S: BackingStore,
    R: Read,
    W: Write + ?Sized,
{
    let records = Reader::new(input, reader).each_row(cancel, |row| writer.write(row))?;
    let merge = writer.merge(out)?;
    out.flush().map_err(DelimitedError::OutputFlush)?;
    Ok(SplitSummary { records, merge })
}
