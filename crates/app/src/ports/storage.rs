//! Storage port: string key/value persistence for session bookkeeping.

use std::future::Future;

use homelink_domain::error::HomelinkError;

/// Durable string key/value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, HomelinkError>> + Send;

    /// Insert or overwrite `key`.
    fn set(&self, key: &str, value: &str)
    -> impl Future<Output = Result<(), HomelinkError>> + Send;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), HomelinkError>> + Send;
}

impl<T: KeyValueStore + Send + Sync> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, HomelinkError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        (**self).remove(key)
    }
}
