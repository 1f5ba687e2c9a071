use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored value together with the time it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Durable string key/value medium for per-course progress.
///
/// Keys are independent; there is no cross-key transaction.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the entry stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the medium cannot be read.
    async fn get(&self, key: &str) -> Result<Option<KvEntry>, StorageError>;

    /// Insert or overwrite `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn put(&self, key: &str, value: &str, at: DateTime<Utc>) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the medium cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, KvEntry>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<KvEntry>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str, at: DateTime<Utc>) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            key.to_owned(),
            KvEntry {
                value: value.to_owned(),
                updated_at: at,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Active persistence backend behind a trait object for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            kv: Arc::new(InMemoryRepository::new()),
        }
    }

    #[must_use]
    pub fn from_store(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use course_core::time::fixed_now;

    #[tokio::test]
    async fn put_overwrites_and_restamps() {
        let repo = InMemoryRepository::new();
        repo.put("a-completed", "true", fixed_now()).await.unwrap();
        let later = fixed_now() + Duration::minutes(5);
        repo.put("a-completed", "false", later).await.unwrap();

        let entry = repo.get("a-completed").await.unwrap().unwrap();
        assert_eq!(entry.value, "false");
        assert_eq!(entry.updated_at, later);
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.get("nope").await.unwrap().is_none());
        repo.remove("nope").await.unwrap();
    }

    #[tokio::test]
    async fn storage_clones_share_state() {
        let storage = Storage::in_memory();
        let other = storage.clone();
        storage.kv.put("k", "v", fixed_now()).await.unwrap();
        assert_eq!(other.kv.get("k").await.unwrap().unwrap().value, "v");
        other.kv.remove("k").await.unwrap();
        assert!(storage.kv.get("k").await.unwrap().is_none());
    }
}
