//! Persistent key/value storage for session data.
//!
//! This plays the part `localStorage` plays in a browser: string keys, string
//! values, and contents that outlive the process. Writes go through
//! [`KeyValueStore::apply`], which takes a whole batch so that the session's
//! tokens and user snapshot change together or not at all.

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_DATA_KEY: &str = "userData";

/// Every key the session owns.
pub const SESSION_KEYS: [&str; 3] = [REFRESH_TOKEN_KEY, ACCESS_TOKEN_KEY, USER_DATA_KEY];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Set(String, String),
    Remove(String),
}

impl Mutation {
    pub fn set(key: &str, value: impl Into<String>) -> Self {
        Mutation::Set(key.to_string(), value.into())
    }

    pub fn remove(key: &str) -> Self {
        Mutation::Remove(key.to_string())
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Apply every mutation in `batch`, in order, atomically. If this returns
    /// an error none of the batch is visible.
    fn apply(&self, batch: &[Mutation]) -> Result<(), StorageError>;

    /// Drop every entry without reading the current contents first. This is
    /// the way out when the contents can no longer be parsed.
    fn clear(&self) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.apply(&[Mutation::set(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.apply(&[Mutation::remove(key)])
    }
}
