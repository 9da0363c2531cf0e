// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer: an opaque key-value store holding serialized snapshots.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Record keys as constants.
pub mod keys {
    /// Full snapshot of the workout list
    pub const WORKOUTS: &str = "workouts";
}

/// A string key-value store. Values are opaque to the store.
///
/// `set` replaces any previous value for the key in full.
pub trait KeyValueStore: Send + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Errors from the storage engine.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}
