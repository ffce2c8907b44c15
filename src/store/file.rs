//! File-backed key/value store.
//!
//! Persists the whole key space as a single JSON object. The file is
//! read once on open; every `set` updates the in-memory map and writes
//! the file through.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::KeyValueStore;

/// A durable store backed by a JSON file.
///
/// Opening never fails: if the file cannot be read or created the store
/// comes up unavailable and retains the error for inspection. Write
/// failures after a successful open are logged and otherwise ignored,
/// matching the fire-and-forget contract of [`KeyValueStore::set`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    available: bool,
    last_error: Option<String>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty file if none exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        let (entries, available, last_error) = match Self::load(&path) {
            Ok(entries) => (entries, true, None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "state file unusable, running without persistence");
                (BTreeMap::new(), false, Some(e))
            }
        };

        Self {
            path,
            entries,
            available,
            last_error,
        }
    }

    /// Returns the path backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The error that made the store unavailable, if any.
    pub fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, String> {
        if !path.exists() {
            // Prove the location is writable before reporting available
            return match fs::write(path, "{}") {
                Ok(()) => Ok(BTreeMap::new()),
                Err(e) => Err(format!("create failed: {e}")),
            };
        }

        let content = fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
        serde_json::from_str(&content).map_err(|e| format!("parse failed: {e}"))
    }

    fn flush(&mut self) {
        let json = match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "could not serialise state");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "could not write state file");
            self.last_error = Some(format!("write failed: {e}"));
        }
    }
}

impl KeyValueStore for FileStore {
    fn available(&self) -> bool {
        self.available
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStore::open(&path);
        assert!(store.available());
        assert!(store.error().is_none());
        assert!(path.exists());
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("state.json"));

        assert_eq!(store.get("localhost:_interval"), None);
        store.set("localhost:_interval", "300s");
        assert_eq!(store.get("localhost:_interval").as_deref(), Some("300s"));

        // Empty strings are stored values, not absence
        store.set("localhost:_resolution", "");
        assert_eq!(store.get("localhost:_resolution").as_deref(), Some(""));
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let mut store = FileStore::open(&path);
            store.set("sensor-1:temperature.function", "MAX");
        }

        let store = FileStore::open(&path);
        assert!(store.available());
        assert_eq!(
            store.get("sensor-1:temperature.function").as_deref(),
            Some("MAX")
        );
    }

    #[test]
    fn test_uncreatable_path_is_unavailable() {
        let store = FileStore::open("/nonexistent/dir/state.json");
        assert!(!store.available());
        assert!(store.error().unwrap().contains("create failed"));
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path);
        assert!(!store.available());
        assert!(store.error().unwrap().contains("parse failed"));
    }
}
