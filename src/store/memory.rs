//! In-memory backing area.

use crate::store::BackingStore;
use std::collections::BTreeMap;
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

type UnitMap = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

fn lock(units: &UnitMap) -> io::Result<MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
    units
        .lock()
        .map_err(|_| io::Error::other("memory store mutex poisoned"))
}

/// Backing area that keeps every unit in memory.
///
/// Clones share the same units, so a test can keep a handle and inspect what
/// the writer left behind after handing the store over.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    units: UnitMap,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every unit and its bytes, ordered by name.
    ///
    /// # Errors
    /// Fails only if a previous holder of the lock panicked.
    pub fn snapshot(&self) -> io::Result<BTreeMap<String, Vec<u8>>> {
        Ok(lock(&self.units)?.clone())
    }
}

/// Append handle to one in-memory unit.
#[derive(Debug)]
pub struct MemoryUnit {
    name: String,
    units: UnitMap,
}

impl Write for MemoryUnit {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.units)?
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl BackingStore for MemoryStore {
    type Unit = MemoryUnit;
    type Source = Cursor<Vec<u8>>;

    fn location(&self) -> Option<&Path> {
        None
    }

    fn open_unit(&mut self, name: &str) -> io::Result<MemoryUnit> {
        lock(&self.units)?.entry(name.to_string()).or_default();
        Ok(MemoryUnit {
            name: name.to_string(),
            units: Arc::clone(&self.units),
        })
    }

    fn open_source(&mut self, name: &str) -> io::Result<Self::Source> {
        lock(&self.units)?
            .get(name)
            .cloned()
            .map(Cursor::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no unit {name:?}")))
    }

    fn list_units(&self) -> io::Result<Vec<String>> {
        Ok(lock(&self.units)?.keys().cloned().collect())
    }

    fn remove_unit(&mut self, name: &str) -> io::Result<()> {
        lock(&self.units)?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no unit {name:?}")))
    }

    fn destroy(self) -> io::Result<()> {
        lock(&self.units)?.clear();
        Ok(())
    }
}
