use async_trait::async_trait;
use keyring::Entry;

use super::{KeyValueStore, StorageResult};

/// Default keychain service the entries are filed under
pub const DEFAULT_SERVICE_NAME: &str = "ecoterra";

/// Stores each key as its own OS keychain entry.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> StorageResult<Entry> {
        Ok(Entry::new(&self.service, key)?)
    }

    /// Run a keychain call on the blocking pool; the platform backends may
    /// wait on IPC.
    async fn with_entry<T, F>(&self, key: &str, op: F) -> StorageResult<T>
    where
        F: FnOnce(Entry) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let entry = self.entry(key)?;
        tokio::task::spawn_blocking(move || op(entry)).await?
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let value = value.to_string();
        self.with_entry(key, move |entry| Ok(entry.set_password(&value)?))
            .await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        })
        .await
    }
}
