//! Grouping writer: routes records into one storage unit per group key and
//! merges the units back into a single stream.
//!
//! # Lifecycle
//!
//! 1. [`MultiWriter::write`] derives the group key of each record. When the key
//!    differs from the current group, the open unit is flushed and closed and
//!    the unit for the new key is opened (created on first use, appended to
//!    afterwards). At most one unit is open at any time.
//! 2. [`MultiWriter::merge`] closes the open unit, then streams every unit into
//!    the output in ascending name order, deleting each one after it has been
//!    copied.
//! 3. [`MultiWriter::close`] releases the open unit and removes the whole
//!    backing area.
//!
//! # Failure behaviour
//!
//! Nothing is rolled back. A failed switch leaves the writer idle (the old unit
//! closed, no new unit open) and the next write starts from there. A unit whose
//! write or flush failed is dropped the same way and never written to again by
//! that encoder, so bytes that already reached it are not repeated. A failed
//! copy aborts the merge but keeps the failing unit, so calling `merge` again
//! resumes with that unit. A unit that was copied but could not be deleted is
//! logged, counted in [`MergeSummary::cleanup_failures`] and remembered, so a
//! later merge does not emit it twice.
//!
//! # Example
//!
//! ```
//! use delimited::{MultiWriter, MultiWriterConfig};
//! # fn main() -> delimited::Result<()> {
//! let mut w = MultiWriter::new(&MultiWriterConfig::new(vec![0]))?;
//! w.write(&["a", "1"])?;
//! w.write(&["b", "2"])?;
//! w.write(&["a", "3"])?;
//!
//! let mut out = Vec::new();
//! w.merge(&mut out)?;
//! w.close()?;
//! assert_eq!(out, b"a,1\na,3\nb,2\n");
//! # Ok(())
//! # }
//! ```

use crate::error::{DelimitedError, Result, StorageOp};
use crate::group::GroupColumns;
use crate::io::Writer;
use crate::options::{MultiWriterConfig, WriterOptions};
use crate::record::Row;
use crate::store::{BackingStore, TempDirStore};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

/// The open unit of the current group and the encoder bound to it.
pub(crate) struct ActiveUnit<U: Write> {
    key: String,
    writer: Writer<U>,
}

impl<U: Write> ActiveUnit<U> {
    /// Flush the encoder, then drop it together with the unit handle.
    fn close(mut self) -> Result<()> {
        let flushed = self.writer.flush();
        flushed.map_err(|source| DelimitedError::Flush {
            unit: self.key,
            source,
        })
    }
}

/// Routing state: idle (`active` is `None`) or one open group.
pub(crate) struct SinkState<U: Write> {
    active: Option<ActiveUnit<U>>,
}

impl<U: Write> SinkState<U> {
    pub(crate) fn idle() -> Self {
        Self { active: None }
    }

    pub(crate) fn current_key(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.key.as_str())
    }

    /// Return the encoder for `key`, switching groups first if needed.
    ///
    /// On a switch the previous unit is closed before `open` is called. If
    /// either step fails the state is left idle.
    pub(crate) fn route<F>(&mut self, key: String, open: F) -> Result<&mut Writer<U>>
    where
        F: FnOnce(&str) -> Result<Writer<U>>,
    {
        let active = match self.active.take() {
            Some(active) if active.key == key => active,
            previous => {
                if let Some(previous) = previous {
                    log::debug!("closing group {:?}", previous.key);
                    previous.close()?;
                }
                let writer = open(&key)?;
                log::debug!("opened group {key:?}");
                ActiveUnit { key, writer }
            }
        };
        Ok(&mut self.active.insert(active).writer)
    }

    /// Flush the open encoder without closing its unit.
    ///
    /// A failed flush drops the unit and leaves the state idle.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let Some(active) = &mut self.active else {
            return Ok(());
        };
        if let Err(source) = active.writer.flush() {
            let unit = active.key.clone();
            self.abandon();
            return Err(DelimitedError::Flush { unit, source });
        }
        Ok(())
    }

    /// Drop the open unit without flushing it again.
    pub(crate) fn abandon(&mut self) {
        if let Some(active) = self.active.take() {
            log::debug!("abandoning group {:?} after a failed write", active.key);
        }
    }

    /// Flush and close the open unit. The state is idle afterwards, even on error.
    pub(crate) fn finish(&mut self) -> Result<()> {
        match self.active.take() {
            Some(active) => active.close(),
            None => Ok(()),
        }
    }
}

/// Outcome of one [`MultiWriter::merge`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Units copied into the output by this call.
    pub units: usize,
    /// Bytes copied into the output by this call.
    pub bytes: u64,
    /// Copied units that could not be deleted afterwards.
    pub cleanup_failures: usize,
}

/// Writes records into one storage unit per group and merges them on demand.
///
/// There is no internal locking. Every method takes `&mut self` or `self`, so
/// sharing one writer between threads needs the caller's own coordination.
pub struct MultiWriter<S: BackingStore = TempDirStore> {
    columns: GroupColumns,
    options: WriterOptions,
    store: S,
    state: SinkState<S::Unit>,
    /// Units already copied into an output whose deletion failed.
    drained: BTreeSet<String>,
}

impl MultiWriter<TempDirStore> {
    /// Build a writer backed by a fresh temporary directory.
    ///
    /// # Errors
    /// [`DelimitedError::NoGroupColumns`] for an empty column list, or a
    /// storage error if the directory cannot be created.
    pub fn new(config: &MultiWriterConfig) -> Result<Self> {
        let columns = GroupColumns::new(config.group_columns.clone())?
            .with_encoding(config.key_encoding);
        let store = TempDirStore::new(&config.temp_prefix)?;
        Ok(Self::from_parts(columns, config.writer, store))
    }

    /// Directory holding the storage units.
    #[must_use]
    pub fn temp_dir(&self) -> &Path {
        self.store.path()
    }
}

impl<S: BackingStore> MultiWriter<S> {
    /// Build a writer over a caller-supplied backing area.
    ///
    /// `config.temp_prefix` is ignored.
    ///
    /// # Errors
    /// [`DelimitedError::NoGroupColumns`] for an empty column list.
    pub fn with_store(config: &MultiWriterConfig, store: S) -> Result<Self> {
        let columns = GroupColumns::new(config.group_columns.clone())?
            .with_encoding(config.key_encoding);
        Ok(Self::from_parts(columns, config.writer, store))
    }

    fn from_parts(columns: GroupColumns, options: WriterOptions, store: S) -> Self {
        Self {
            columns,
            options,
            store,
            state: SinkState::idle(),
            drained: BTreeSet::new(),
        }
    }

    /// Route one record to the unit of its group.
    ///
    /// # Errors
    /// - [`DelimitedError::ColumnOutOfRange`] if the record is too short for the
    ///   group columns; the current group is left untouched.
    /// - Flush or storage errors from switching groups; the writer is idle
    ///   afterwards and the next write opens a unit again.
    /// - [`DelimitedError::Csv`] if encoding fails; the writer is idle
    ///   afterwards.
    pub fn write<R: Row + ?Sized>(&mut self, row: &R) -> Result<()> {
        let Self {
            columns,
            options,
            store,
            state,
            drained,
        } = self;
        let key = columns.key_for(row)?;
        let writer = state.route(key, |key| {
            if drained.contains(key) {
                // Stale copy left behind by an earlier merge; it was already emitted.
                remove_unit(store, key)?;
                drained.remove(key);
            }
            let unit = store
                .open_unit(key)
                .map_err(|e| DelimitedError::storage(StorageOp::Open, key, e))?;
            Ok(Writer::new(unit, options))
        })?;
        let written = writer.write(row);
        if written.is_err() {
            state.abandon();
        }
        written
    }

    /// Flush the open unit's encoder. No-op when no group is open.
    ///
    /// # Errors
    /// [`DelimitedError::Flush`] from the underlying unit. The unit is dropped
    /// and the writer is idle afterwards; records still buffered for it are
    /// lost, and the unit may end with a partial record.
    pub fn flush(&mut self) -> Result<()> {
        self.state.flush()
    }

    /// Key of the group currently open for writing.
    #[must_use]
    pub fn current_group(&self) -> Option<&str> {
        self.state.current_key()
    }

    #[must_use]
    pub fn group_columns(&self) -> &GroupColumns {
        &self.columns
    }

    /// Location of the backing area, if it lives on disk.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.store.location()
    }

    /// Names of the units currently held by the backing area, sorted.
    ///
    /// # Errors
    /// Storage error if the area cannot be listed.
    pub fn units(&self) -> Result<Vec<String>> {
        let mut names = self.list_units()?;
        names.sort_unstable();
        Ok(names)
    }

    fn list_units(&self) -> Result<Vec<String>> {
        self.store.list_units().map_err(|e| {
            let area = self
                .store
                .location()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            DelimitedError::storage(StorageOp::List, area, e)
        })
    }

    /// Copy every unit into `out`, in ascending name order, deleting each unit
    /// once it has been copied.
    ///
    /// The open unit is flushed and closed first, so writing after a merge
    /// starts new units. The output is not flushed.
    ///
    /// # Errors
    /// - [`DelimitedError::Flush`] if the open unit cannot be flushed.
    /// - [`DelimitedError::Storage`] if the area cannot be listed or a unit
    ///   cannot be opened.
    /// - [`DelimitedError::Copy`] if streaming a unit fails. Units merged
    ///   before it stay deleted; that unit and the rest stay in place, and
    ///   `out` may hold a partial copy of it.
    ///
    /// Failing to delete a copied unit is not an error; see
    /// [`MergeSummary::cleanup_failures`].
    pub fn merge<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<MergeSummary> {
        self.state.finish()?;

        let mut names = self.list_units()?;
        names.sort_unstable();

        let mut summary = MergeSummary::default();
        for name in names {
            if self.drained.contains(&name) {
                match remove_unit(&mut self.store, &name) {
                    Ok(()) => {
                        self.drained.remove(&name);
                    }
                    Err(e) => {
                        log::warn!("already merged unit {name:?} still cannot be removed: {e}");
                        summary.cleanup_failures += 1;
                    }
                }
                continue;
            }

            let mut source = self
                .store
                .open_source(&name)
                .map_err(|e| DelimitedError::storage(StorageOp::Read, name.as_str(), e))?;
            let bytes = io::copy(&mut source, out).map_err(|source| DelimitedError::Copy {
                unit: name.clone(),
                source,
            })?;
            drop(source);
            summary.units += 1;
            summary.bytes += bytes;

            if let Err(e) = remove_unit(&mut self.store, &name) {
                log::warn!("merged unit {name:?} could not be removed: {e}");
                summary.cleanup_failures += 1;
                self.drained.insert(name);
            }
        }

        log::info!(
            "merged {} units ({} bytes), {} cleanup failures",
            summary.units,
            summary.bytes,
            summary.cleanup_failures
        );
        Ok(summary)
    }

    /// Close the open unit and remove the backing area with everything in it.
    ///
    /// Removal is attempted even if closing the open unit fails; the first
    /// error is returned.
    ///
    /// # Errors
    /// [`DelimitedError::Flush`] from the open unit, or a storage error from
    /// removing the area.
    pub fn close(self) -> Result<()> {
        let Self {
            mut state, store, ..
        } = self;
        let closed = state.finish();
        let area = store
            .location()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let destroyed = store
            .destroy()
            .map_err(|e| DelimitedError::storage(StorageOp::Destroy, area, e));
        closed.and(destroyed)
    }
}

/// Remove a unit, treating an already missing unit as removed.
fn remove_unit<S: BackingStore>(store: &mut S, name: &str) -> Result<()> {
    match store.remove_unit(name) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DelimitedError::storage(StorageOp::Remove, name, e)),
    }
}
