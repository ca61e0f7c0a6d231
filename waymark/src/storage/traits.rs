//! Core trait for the persistence layer.
//!
//! The `KeyValueStore` trait is a flat, domain-agnostic key-value interface.
//! The marker store and the tracking settings both persist through it, so
//! any backend (memory, files, a platform preference store) can be swapped in.
//!
//! # Design Principles
//!
//! - **String keys**: Human-readable for debugging
//! - **Vec<u8> values**: Raw bytes, encoding is the caller's concern
//! - **Minimal interface**: `get`, `set`, `remove` only
//! - **Dyn-compatible**: Uses `Pin<Box<dyn Future>>` for trait object support
//!
//! # Example
//!
//! ```ignore
//! use waymark::storage::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set("saved_markers", b"[]".to_vec()).await?;
//! let value = store.get("saved_markers").await?;
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur in a persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error while reading or writing a value.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters the backend cannot represent.
    #[error("Invalid key '{0}': only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidKey(String),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Flat key-value persistence interface.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if the backend failed
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StorageError>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), StorageError>>;

    /// Remove `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the key existed and was removed
    /// - `Ok(false)` if the key did not exist
    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, StorageError>>;
}

/// Shared persistence handle.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Check that a key is safe to use as a file name on every platform.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_plain_keys() {
        assert!(validate_key("saved_markers").is_ok());
        assert!(validate_key("location-tracking-active").is_ok());
        assert!(validate_key("Key42").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_paths() {
        assert!(matches!(
            validate_key("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("with space").is_err());
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::InvalidKey("a/b".to_string());
        assert!(err.to_string().contains("a/b"));

        let err = StorageError::Io {
            path: PathBuf::from("/data/saved_markers"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = err.to_string();
        assert!(message.contains("/data/saved_markers"));
        assert!(message.contains("denied"));
    }
}
