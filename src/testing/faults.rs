//! Failure injection for storage and output sinks.

use crate::store::BackingStore;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A one-shot failure armed on a [`FaultyStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Opening the named unit for appending fails.
    Open(String),
    /// The next write to the named unit stores one byte, then the write after
    /// it fails. Models a device that fills up in the middle of a record.
    Write(String),
    /// The first read from the named unit fails mid-merge.
    Read(String),
    /// Removing the named unit fails.
    Remove(String),
    /// Removing the backing area fails.
    Destroy,
}

/// Shared list of armed faults. Clones arm the same store.
#[derive(Clone, Debug, Default)]
pub struct FaultPlan {
    armed: Arc<Mutex<Vec<Fault>>>,
}

impl FaultPlan {
    /// Arm `fault`; it fires once on the next matching operation.
    ///
    /// # Panics
    ///
    /// Panics if the plan's mutex is poisoned.
    pub fn fail_once(&self, fault: Fault) {
        self.armed.lock().expect("fault plan mutex poisoned").push(fault);
    }

    /// Faults armed but not fired yet.
    ///
    /// # Panics
    ///
    /// Panics if the plan's mutex is poisoned.
    #[must_use]
    pub fn pending(&self) -> Vec<Fault> {
        self.armed.lock().expect("fault plan mutex poisoned").clone()
    }

    fn trip(&self, fault: &Fault) -> io::Result<()> {
        let mut armed = self.armed.lock().expect("fault plan mutex poisoned");
        match armed.iter().position(|f| f == fault) {
            Some(i) => {
                armed.remove(i);
                Err(io::Error::other(format!("injected fault: {fault:?}")))
            }
            None => Ok(()),
        }
    }
}

/// [`BackingStore`] wrapper that fails selected operations once.
///
/// ```
/// use delimited::store::MemoryStore;
/// use delimited::testing::{Fault, FaultyStore};
///
/// let store = FaultyStore::new(MemoryStore::new());
/// let plan = store.plan();
/// plan.fail_once(Fault::Remove("a".into()));
/// ```
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    plan: FaultPlan,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            plan: FaultPlan::default(),
        }
    }

    /// Handle for arming faults after the store has been handed over.
    #[must_use]
    pub fn plan(&self) -> FaultPlan {
        self.plan.clone()
    }
}

/// Unit handle that consults the plan before every write.
pub struct FaultyUnit<W> {
    inner: W,
    name: String,
    plan: FaultPlan,
    fail_next: bool,
}

impl<W: Write> Write for FaultyUnit<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_next {
            self.fail_next = false;
            return Err(io::Error::other("injected write fault"));
        }
        if !buf.is_empty() && self.plan.trip(&Fault::Write(self.name.clone())).is_err() {
            self.fail_next = true;
            return self.inner.write(&buf[..1]);
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Reader that fails its first read when armed.
pub struct FaultySource<R> {
    inner: R,
    fail_next: bool,
}

impl<R: Read> Read for FaultySource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_next {
            self.fail_next = false;
            return Err(io::Error::other("injected read fault"));
        }
        self.inner.read(buf)
    }
}

impl<S: BackingStore> BackingStore for FaultyStore<S> {
    type Unit = FaultyUnit<S::Unit>;
    type Source = FaultySource<S::Source>;

    fn location(&self) -> Option<&Path> {
        self.inner.location()
    }

    fn open_unit(&mut self, name: &str) -> io::Result<Self::Unit> {
        self.plan.trip(&Fault::Open(name.to_string()))?;
        Ok(FaultyUnit {
            inner: self.inner.open_unit(name)?,
            name: name.to_string(),
            plan: self.plan.clone(),
            fail_next: false,
        })
    }

    fn open_source(&mut self, name: &str) -> io::Result<Self::Source> {
        let fail_next = self.plan.trip(&Fault::Read(name.to_string())).is_err();
        Ok(FaultySource {
            inner: self.inner.open_source(name)?,
            fail_next,
        })
    }

    fn list_units(&self) -> io::Result<Vec<String>> {
        self.inner.list_units()
    }

    fn remove_unit(&mut self, name: &str) -> io::Result<()> {
        self.plan.trip(&Fault::Remove(name.to_string()))?;
        self.inner.remove_unit(name)
    }

    fn destroy(self) -> io::Result<()> {
        self.plan.trip(&Fault::Destroy)?;
        self.inner.destroy()
    }
}

/// Output sink that accepts `limit` bytes and then fails every write.
#[derive(Debug, Default)]
pub struct FailingSink {
    accepted: Vec<u8>,
    remaining: usize,
}

impl FailingSink {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            accepted: Vec::new(),
            remaining: limit,
        }
    }

    /// Bytes accepted before the failure.
    #[must_use]
    pub fn accepted(&self) -> &[u8] {
        &self.accepted
    }
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::other("sink limit reached"));
        }
        let n = buf.len().min(self.remaining);
        self.accepted.extend_from_slice(&buf[..n]);
        self.remaining -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn faults_fire_once() {
        let mut store = FaultyStore::new(MemoryStore::new());
        let plan = store.plan();
        plan.fail_once(Fault::Open("a".into()));
        assert!(store.open_unit("a").is_err());
        assert!(store.open_unit("a").is_ok());
        assert!(plan.pending().is_empty());
    }

    #[test]
    fn read_fault_surfaces_on_first_read() {
        let mut store = FaultyStore::new(MemoryStore::new());
        store.open_unit("a").unwrap().write_all(b"xyz").unwrap();
        store.plan().fail_once(Fault::Read("a".into()));
        let mut src = store.open_source("a").unwrap();
        let mut buf = [0u8; 8];
        assert!(src.read(&mut buf).is_err());
        assert_eq!(src.read(&mut buf).unwrap(), 3);
    }

    #[test]
    fn write_fault_stores_one_byte_then_fails() {
        let store = MemoryStore::new();
        let mut faulty = FaultyStore::new(store.clone());
        faulty.plan().fail_once(Fault::Write("a".into()));
        let mut unit = faulty.open_unit("a").unwrap();
        assert!(unit.write_all(b"xyz").is_err());
        unit.write_all(b"!").unwrap();
        assert_eq!(store.snapshot().unwrap()["a"], b"x!");
    }

    #[test]
    fn sink_keeps_the_accepted_prefix() {
        let mut sink = FailingSink::new(4);
        assert!(sink.write_all(b"abcdef").is_err());
        assert_eq!(sink.accepted(), b"abcd");
    }
}
