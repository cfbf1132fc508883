//! Persistence media for the state snapshot.
//!
//! A medium is a small textual key-value store. The file medium keeps one
//! JSON file per key and uses file locking plus atomic renames so a reader
//! never observes a half-written snapshot.

use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Key the application snapshot is stored under
pub const SNAPSHOT_KEY: &str = "aura_state";

/// Textual key-value store holding serialized snapshots
pub trait SnapshotMedium {
    /// Returns `None` when nothing is stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, contents: &str) -> Result<()>;
    /// Removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Directory-backed medium: `<dir>/<key>.json`
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn read_locked(path: &Path) -> Result<String> {
        let file = File::open(path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        Ok(contents)
    }
}

impl SnapshotMedium for FileMedium {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            tracing::debug!("No snapshot at {:?}", path);
            return Ok(None);
        }

        let contents = Self::read_locked(&path)?;
        tracing::debug!("Read snapshot {:?} ({} bytes)", path, contents.len());
        Ok(Some(contents))
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        // Temp file in the same directory so the rename stays atomic
        let temp = NamedTempFile::new_in(&self.dir)?;

        // Lock the temp file while it is written; the rename decides which writer wins
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        let path = self.path_for(key);
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote snapshot {:?}", path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed snapshot {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process medium for embedders and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryMedium {
    entries: HashMap<String, String>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, as if an earlier session had written it
    pub fn with_entry(mut self, key: &str, contents: &str) -> Self {
        self.entries.insert(key.to_string(), contents.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl SnapshotMedium for MemoryMedium {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<()> {
        self.entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut medium = FileMedium::new(temp_dir.path().join("data"));

        medium.write(SNAPSHOT_KEY, "{\"view\":\"home\"}").unwrap();

        let read = medium.read(SNAPSHOT_KEY).unwrap();
        assert_eq!(read.as_deref(), Some("{\"view\":\"home\"}"));
        assert!(temp_dir.path().join("data/aura_state.json").exists());
    }

    #[test]
    fn test_file_read_missing_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::new(temp_dir.path());
        assert_eq!(medium.read(SNAPSHOT_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_remove_missing_is_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut medium = FileMedium::new(temp_dir.path());
        medium.remove(SNAPSHOT_KEY).unwrap();

        medium.write(SNAPSHOT_KEY, "{}").unwrap();
        medium.remove(SNAPSHOT_KEY).unwrap();
        assert_eq!(medium.read(SNAPSHOT_KEY).unwrap(), None);
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut medium = FileMedium::new(temp_dir.path());

        medium.write(SNAPSHOT_KEY, "{}").unwrap();
        medium.write(SNAPSHOT_KEY, "{\"logs\":[]}").unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "aura_state.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only aura_state.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_memory_medium() {
        let mut medium = MemoryMedium::new().with_entry("other", "x");
        assert_eq!(medium.read(SNAPSHOT_KEY).unwrap(), None);

        medium.write(SNAPSHOT_KEY, "{}").unwrap();
        assert_eq!(medium.get(SNAPSHOT_KEY), Some("{}"));

        medium.remove(SNAPSHOT_KEY).unwrap();
        assert_eq!(medium.get(SNAPSHOT_KEY), None);
        assert_eq!(medium.get("other"), Some("x"));
    }
}
