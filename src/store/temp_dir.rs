//! Filesystem backing area: one file per unit in a private temporary directory.

use crate::error::{DelimitedError, Result, StorageOp};
use crate::store::BackingStore;
use std::fs::{File, OpenOptions, read_dir, remove_file};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Backing area rooted in a fresh temporary directory.
///
/// The directory is removed by [`BackingStore::destroy`]. If the store is
/// dropped without being destroyed, `tempfile` removes it on a best-effort
/// basis.
#[derive(Debug)]
pub struct TempDirStore {
    dir: TempDir,
}

impl TempDirStore {
    /// Create a backing directory under the system temp directory.
    ///
    /// # Errors
    /// [`DelimitedError::Storage`] if the directory cannot be created.
    pub fn new(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|e| DelimitedError::storage(StorageOp::CreateArea, prefix, e))?;
        log::debug!("created backing area {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create a backing directory inside `parent`.
    ///
    /// # Errors
    /// [`DelimitedError::Storage`] if the directory cannot be created.
    pub fn new_in(parent: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .map_err(|e| DelimitedError::storage(StorageOp::CreateArea, prefix, e))?;
        log::debug!("created backing area {}", dir.path().display());
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Map a unit name to its file, refusing names that would escape the
    /// directory or name the directory itself.
    fn unit_path(&self, name: &str) -> io::Result<PathBuf> {
        let unusable = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if unusable {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{name:?} cannot be used as a file name"),
            ));
        }
        Ok(self.dir.path().join(name))
    }
}

impl BackingStore for TempDirStore {
    type Unit = File;
    type Source = File;

    fn location(&self) -> Option<&Path> {
        Some(self.dir.path())
    }

    fn open_unit(&mut self, name: &str) -> io::Result<File> {
        let path = self.unit_path(name)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
    }

    fn open_source(&mut self, name: &str) -> io::Result<File> {
        File::open(self.unit_path(name)?)
    }

    fn list_units(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in read_dir(self.dir.path())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::warn!("skipping non UTF-8 entry {raw:?} in backing area"),
            }
        }
        Ok(names)
    }

    fn remove_unit(&mut self, name: &str) -> io::Result<()> {
        remove_file(self.unit_path(name)?)
    }

    fn destroy(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        log::debug!("removed backing area {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn units_are_created_appended_and_listed() {
        let mut store = TempDirStore::new("store-test").unwrap();
        {
            let mut u = store.open_unit("a").unwrap();
            u.write_all(b"one\n").unwrap();
        }
        {
            let mut u = store.open_unit("a").unwrap();
            u.write_all(b"two\n").unwrap();
        }
        store.open_unit("b").unwrap();

        let mut names = store.list_units().unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);

        let mut s = String::new();
        store.open_source("a").unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "one\ntwo\n");
    }

    #[test]
    fn unusable_names_are_rejected() {
        let mut store = TempDirStore::new("store-test").unwrap();
        for name in ["", ".", "..", "a/b", "a\\b"] {
            let err = store.open_unit(name).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "name {name:?}");
        }
        assert!(store.list_units().unwrap().is_empty());
    }

    #[test]
    fn destroy_removes_the_directory() {
        let mut store = TempDirStore::new("store-test").unwrap();
        store.open_unit("x").unwrap();
        let path = store.path().to_path_buf();
        assert!(path.exists());
        store.destroy().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn remove_missing_unit_fails() {
        let mut store = TempDirStore::new("store-test").unwrap();
        assert_eq!(
            store.remove_unit("nope").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn new_in_places_the_area_under_parent() {
        let parent = tempfile::tempdir().unwrap();
        let store = TempDirStore::new_in(parent.path(), "nested").unwrap();
        assert!(store.path().starts_with(parent.path()));
        assert_eq!(store.location(), Some(store.path()));
    }
}
