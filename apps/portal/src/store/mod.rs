//! File-backed key/value store, the client-side analog of the browser's
//! local storage: one file per key, raw string values, atomic writes
//! (temp file + rename into place).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::ClientError;

/// Cached profile JSON, exactly as the server produced it.
pub const PROFILE_KEY: &str = "portfolio_profile";
/// Chat overlay open/minimized flag: `"1"` open, `"0"` minimized.
pub const CHAT_OPEN_KEY: &str = "agent_chat_is_open";

#[derive(Debug, Clone)]
pub struct KvStore {
    dir: PathBuf,
}

impl KvStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ClientError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// An unreadable or absent entry is a miss, never an error.
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                debug!(key, error = %e, "unreadable store entry treated as absent");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let path = self.path_for(key)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|e| ClientError::Storage(e.error))?;
        Ok(())
    }

    /// Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), ClientError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ClientError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(ClientError::Validation(format!("invalid store key '{key}'")));
        }
        Ok(self.dir.join(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, KvStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = KvStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_set_get_round_trip() {
        let (_dir, store) = store();
        store.set(CHAT_OPEN_KEY, "1").unwrap();
        assert_eq!(store.get(CHAT_OPEN_KEY).as_deref(), Some("1"));
    }

    #[test]
    fn test_get_absent_key_is_none() {
        let (_dir, store) = store();
        assert!(store.get(PROFILE_KEY).is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let (_dir, store) = store();
        store.set(CHAT_OPEN_KEY, "1").unwrap();
        store.set(CHAT_OPEN_KEY, "0").unwrap();
        assert_eq!(store.get(CHAT_OPEN_KEY).as_deref(), Some("0"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, store) = store();
        store.set(PROFILE_KEY, "{}").unwrap();
        store.remove(PROFILE_KEY).unwrap();
        assert!(store.get(PROFILE_KEY).is_none());
        store.remove(PROFILE_KEY).unwrap();
    }

    #[test]
    fn test_path_traversal_keys_rejected() {
        let (_dir, store) = store();
        assert!(store.set("../evil", "x").is_err());
        assert!(store.set("a/b", "x").is_err());
        assert!(store.set("", "x").is_err());
        assert!(store.get("../evil").is_none());
    }

    #[test]
    fn test_reopen_sees_persisted_values() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = KvStore::open(dir.path()).unwrap();
            store.set(PROFILE_KEY, r#"{"name":"Ada"}"#).unwrap();
        }
        let store = KvStore::open(dir.path()).unwrap();
        assert_eq!(store.get(PROFILE_KEY).as_deref(), Some(r#"{"name":"Ada"}"#));
    }
}
