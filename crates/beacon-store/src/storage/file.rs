//! JSON-file key/value storage on the local filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;
use beacon_core::traits::storage::KvStorage;

/// File-backed storage: one file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Root directory for all stored values.
    root: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a key to its file path within the root.
    fn resolve(&self, key: &str) -> PathBuf {
        // Keys are flat identifiers; path separators are replaced so a
        // key can never address anything outside the root.
        let clean: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.root.join(format!("{clean}.json"))
    }

    /// Write a value atomically via a temp file and rename.
    async fn write_atomic(&self, path: &Path, value: &str) -> AppResult<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write {}", tmp.display()),
                e,
            )
        })?;
        fs::rename(&tmp, path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to move {} into place", tmp.display()),
                e,
            )
        })?;
        Ok(())
    }
}

#[async_trait]
impl KvStorage for FileStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.resolve(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read key '{key}'"),
                e,
            )),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.resolve(key);
        self.write_atomic(&path, value).await?;
        debug!(key, bytes = value.len(), "Persisted value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove key '{key}'"),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn make_storage() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_str().unwrap())
            .await
            .expect("storage");
        (dir, storage)
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let (_dir, storage) = make_storage().await;
        storage.set("notifications", "[]").await.unwrap();
        assert_eq!(
            storage.get("notifications").await.unwrap(),
            Some("[]".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let (_dir, storage) = make_storage().await;
        assert_eq!(storage.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (_dir, storage) = make_storage().await;
        storage.set("k", "v").await.unwrap();
        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_key_cannot_escape_root() {
        let (dir, storage) = make_storage().await;
        storage.set("../escape", "v").await.unwrap();
        let expected = dir.path().join(".._escape.json");
        assert!(expected.exists());
    }
}
