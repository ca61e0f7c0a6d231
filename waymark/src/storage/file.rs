//! File-backed persistence backend.
//!
//! Each key is stored as one file under the store's root directory. Writes go
//! to a temporary sibling first and are renamed into place, so a crash never
//! leaves a half-written value behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::traits::{validate_key, BoxFuture, KeyValueStore, StorageError};

/// Extension of the per-key value files.
const VALUE_EXTENSION: &str = "bin";

/// Directory-based key-value store.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StorageError>> {
        let path = self.value_path(key);
        Box::pin(async move {
            let path = path?;
            match tokio::fs::read(&path).await {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(io_error(&path, e)),
            }
        })
    }

    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), StorageError>> {
        let path = self.value_path(key);
        Box::pin(async move {
            let path = path?;

            tokio::fs::create_dir_all(&self.root)
                .await
                .map_err(|e| io_error(&self.root, e))?;

            // Write to temp file first, then rename for atomicity
            let temp_path = path.with_extension("tmp");
            tokio::fs::write(&temp_path, &value)
                .await
                .map_err(|e| io_error(&temp_path, e))?;
            tokio::fs::rename(&temp_path, &path)
                .await
                .map_err(|e| io_error(&path, e))?;

            tracing::trace!(path = %path.display(), bytes = value.len(), "Stored value");
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, StorageError>> {
        let path = self.value_path(key);
        Box::pin(async move {
            let path = path?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(io_error(&path, e)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        store.set("saved_markers", b"[]".to_vec()).await.unwrap();
        assert_eq!(
            store.get("saved_markers").await.unwrap(),
            Some(b"[]".to_vec())
        );
    }

    #[tokio::test]
    async fn test_file_store_missing_key() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        assert!(store.get("nothing_here").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_creates_root_lazily() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("data");
        let store = FileStore::new(&root);

        assert!(!root.exists());
        store.set("flag", vec![1]).await.unwrap();
        assert!(root.join("flag.bin").exists());
        assert!(!root.join("flag.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let temp = TempDir::new().unwrap();

        FileStore::new(temp.path())
            .set("flag", vec![1])
            .await
            .unwrap();

        let reopened = FileStore::new(temp.path());
        assert_eq!(reopened.get("flag").await.unwrap(), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_file_store_remove() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        store.set("flag", vec![1]).await.unwrap();
        assert!(store.remove("flag").await.unwrap());
        assert!(!store.remove("flag").await.unwrap());
        assert!(store.get("flag").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_keys() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        let result = store.set("../escape", vec![1]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
