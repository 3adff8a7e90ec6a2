//! In-memory [`KeyValueStore`] for tests and ephemeral runs.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use homelink_domain::error::HomelinkError;

use crate::ports::KeyValueStore;

/// Process-local key/value store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `entries`.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, HomelinkError>> + Send {
        let value = self.entries().get(key).cloned();
        async { Ok(value) }
    }

    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        self.entries().insert(key.to_string(), value.to_string());
        async { Ok(()) }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        self.entries().remove(key);
        async { Ok(()) }
    }
}
