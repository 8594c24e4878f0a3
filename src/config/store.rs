//! Host storage for persisted configuration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::GatewayConfig;
use crate::Error;

/// Storage key holding the JSON-encoded [`GatewayConfig`].
pub const CONFIG_KEY: &str = "config";

/// Key/value storage owned by the host.
///
/// The gateway only ever touches [`CONFIG_KEY`]. Hosts that already have
/// encrypted or replicated storage implement this trait over it; tests use
/// [`InMemoryStorage`].
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Reads the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), Error>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), Error>;
}

/// Reads and decodes the stored configuration.
///
/// Returns `Ok(None)` when nothing has been written yet.
pub async fn load_config(storage: &dyn Storage) -> Result<Option<GatewayConfig>, Error> {
    let Some(raw) = storage.get(CONFIG_KEY).await? else {
        tracing::debug!("no stored configuration");
        return Ok(None);
    };

    let config = serde_json::from_slice(&raw).map_err(|e| {
        Error::storage(format!("failed to decode configuration: {}", e)).with_source(e)
    })?;
    Ok(Some(config))
}

/// Encodes and stores the configuration.
pub async fn save_config(storage: &dyn Storage, config: &GatewayConfig) -> Result<(), Error> {
    let raw = serde_json::to_vec(config)?;
    storage.put(CONFIG_KEY, raw).await
}

/// In-memory [`Storage`], for tests and single-process hosts.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    reads: AtomicU64,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-populated with `config`.
    pub fn with_config(config: &GatewayConfig) -> Result<Self, Error> {
        let storage = Self::new();
        storage.entries.write().insert(CONFIG_KEY.to_string(), serde_json::to_vec(config)?);
        Ok(storage)
    }

    /// Returns how many `get` calls have been served.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl Storage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), Error> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.entries.write().remove(key);
        Ok(())
    }
}
