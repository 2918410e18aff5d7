//! Secure key-value persistence boundary.
//!
//! The authorization store only needs a single key; the platform's secure
//! storage (keychain, keystore, SQLite) sits behind [`SecureStore`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(String),
    #[error("storage call timed out after {0} ms")]
    Timeout(u64),
    #[error("storage backend error: {0}")]
    Backend(String),
    /// Internal lock poisoning.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Opaque secure key-value store.
#[async_trait]
pub trait SecureStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    async fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory secure store for tests/dev.
///
/// - No IO
/// - Values are lost when the process exits
#[derive(Debug, Default)]
pub struct InMemorySecureStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `key` already holding `value`.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        store
    }
}

#[async_trait]
impl SecureStore for InMemorySecureStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self.entries.lock().map_err(|_| PersistenceError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().map_err(|_| PersistenceError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().map_err(|_| PersistenceError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
