//! Backing areas for per-group storage units.
//!
//! A [`BackingStore`] owns every storage unit of one grouping session. Units
//! are named by their group key, created on first open, appended to while
//! their group is current, then read back and removed by the merge.
//!
//! ## Implementations
//! - [`TempDirStore`]: one file per unit inside a private temporary directory.
//!   This is what [`MultiWriter::new`](crate::MultiWriter::new) uses.
//! - [`MemoryStore`]: units held in memory; useful for tests and for small
//!   inputs where touching the filesystem is not wanted.
//!
//! Custom stores (for example one that injects faults, see
//! [`testing::FaultyStore`](crate::testing::FaultyStore)) only need to
//! implement this trait.

pub mod memory;
pub mod temp_dir;

pub use memory::MemoryStore;
pub use temp_dir::TempDirStore;

use std::io::{self, Read, Write};
use std::path::Path;

/// Owner of all storage units for one session.
pub trait BackingStore {
    /// Append handle to a unit.
    type Unit: Write;
    /// Sequential reader over a unit's bytes.
    type Source: Read;

    /// Location of the backing area, when it has one on disk.
    fn location(&self) -> Option<&Path>;

    /// Open `name` for appending, creating it if it does not exist yet.
    ///
    /// # Errors
    /// Any I/O error from the medium, or `InvalidInput` when `name` is not a
    /// usable unit name for this store.
    fn open_unit(&mut self, name: &str) -> io::Result<Self::Unit>;

    /// Open `name` for reading from the start.
    ///
    /// # Errors
    /// Any I/O error from the medium; `NotFound` if the unit does not exist.
    fn open_source(&mut self, name: &str) -> io::Result<Self::Source>;

    /// Names of all units currently held, in the medium's own order.
    ///
    /// # Errors
    /// Any I/O error from the medium.
    fn list_units(&self) -> io::Result<Vec<String>>;

    /// Delete one unit.
    ///
    /// # Errors
    /// Any I/O error from the medium.
    fn remove_unit(&mut self, name: &str) -> io::Result<()>;

    /// Remove the backing area and every unit left in it.
    ///
    /// # Errors
    /// Any I/O error from the medium.
    fn destroy(self) -> io::Result<()>
    where
        Self: Sized;
}
