//! Durable storage adapters for session state.
//!
//! The credential store talks to storage only through [`SessionStorage`]:
//! read a named key, replace it wholesale, or remove it. Nothing here knows
//! about users or tokens.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{Result, SessionError};

/// Key/value storage used to persist the session across restarts.
///
/// Every `write` is a total replacement of the value under `key`.
pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Shared storage handle.
pub type SharedStorage = Arc<dyn SessionStorage>;

// ============================================================================
// FileStorage
// ============================================================================

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SessionError::Io {
                action: "read",
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let io_err = |source| SessionError::Io {
            action: "write",
            key: key.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Write then rename so readers never see a half-written file.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }

        std::fs::rename(&tmp, &path).map_err(io_err)?;
        tracing::debug!(path = %path.display(), "Session storage written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                action: "remove",
                key: key.to_string(),
                source,
            }),
        }
    }
}

// ============================================================================
// MemoryStorage (for testing)
// ============================================================================

/// In-memory storage with switchable write failures.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, as if left behind by an earlier process.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.entries.lock().insert(key.into(), value.into());
        storage
    }

    /// Make every subsequent `write` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw value under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SessionError::Persistence(format!(
                "write to '{}' rejected",
                key
            )));
        }
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        assert!(storage.read("auth-storage").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_write_replaces_value() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path().join("nested"));

        storage.write("auth-storage", "first").unwrap();
        storage.write("auth-storage", "second").unwrap();

        assert_eq!(
            storage.read("auth-storage").unwrap().as_deref(),
            Some("second")
        );
        assert!(!storage.path_for("auth-storage").with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.write("auth-storage", "{}").unwrap();

        let mode = std::fs::metadata(storage.path_for("auth-storage"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_storage_remove_is_idempotent() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());

        storage.write("auth-storage", "x").unwrap();
        storage.remove("auth-storage").unwrap();
        storage.remove("auth-storage").unwrap();

        assert!(storage.read("auth-storage").unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_write_failure() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);

        let err = storage.write("k", "v").unwrap_err();
        assert!(matches!(err, SessionError::Persistence(_)));
        assert!(storage.get("k").is_none());

        storage.set_fail_writes(false);
        storage.write("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
    }
}
