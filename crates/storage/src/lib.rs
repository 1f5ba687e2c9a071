#![forbid(unsafe_code)]

pub mod progress_keys;
pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, KeyValueStore, KvEntry, Storage, StorageError};
