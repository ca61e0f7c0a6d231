//! Persistence layer.
//!
//! A flat key-value interface with two backends:
//!
//! - [`MemoryStore`]: process-local, for tests and dry runs
//! - [`FileStore`]: one file per key under a data directory
//!
//! The pipeline uses exactly two logical keys, defined here so every
//! component agrees on them.

mod file;
mod memory;
mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{BoxFuture, KeyValueStore, SharedStore, StorageError};

/// Key holding the encoded marker collection.
pub const MARKERS_KEY: &str = "saved_markers";

/// Key holding the persisted tracking-enabled flag.
pub const TRACKING_ENABLED_KEY: &str = "location_tracking_active";
