//! Recipe cache with an optional shared backend and a local fallback.
//!
//! Which backend is used is decided once at startup. After that every call
//! that hits the shared backend and fails is quietly re-run against the
//! local store, so callers never see backend errors.

mod connector;
mod memory;
mod redis_store;

pub use connector::{connect_with_retry, Connector};
pub use memory::MemoryStore;
pub use redis_store::{RedisBackend, RedisConnector, CONNECT_TIMEOUT};

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::CacheEntry;

/// Prefix for every key in the shared backend.
pub const KEY_PREFIX: &str = "recipe:";

/// Shared backend retention: 30 days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(2_592_000);

/// A shared key/value store holding serialized cache entries.
///
/// Keys passed in are full backend keys (already prefixed).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), BackendError>;

    /// Keys matching a glob pattern such as `recipe:*`.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, BackendError>;

    async fn delete(&self, key: &str) -> Result<(), BackendError>;
}

pub struct RecipeCache {
    backend: Option<Arc<dyn CacheBackend>>,
    local: MemoryStore,
    ttl: Duration,
}

impl RecipeCache {
    /// Cache that only ever uses the in-process store.
    pub fn local_only() -> Self {
        Self {
            backend: None,
            local: MemoryStore::new(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
            local: MemoryStore::new(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Use the shared backend when one connected, the local store otherwise.
    pub fn from_connection(backend: Option<Arc<dyn CacheBackend>>) -> Self {
        match backend {
            Some(backend) => Self::with_backend(backend),
            None => Self::local_only(),
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// "memory" when running without a shared backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend
            .as_ref()
            .map(|b| b.name())
            .unwrap_or(MemoryStore::NAME)
    }

    pub async fn set(&self, key: &str, entry: &CacheEntry) {
        if let Some(backend) = &self.backend {
            match serde_json::to_string(entry) {
                Ok(value) => match backend.set_ex(&backend_key(key), &value, self.ttl).await {
                    Ok(()) => {
                        tracing::debug!(key, backend = backend.name(), "cached recipe");
                        return;
                    }
                    Err(e) => degraded("set", key, &e),
                },
                Err(e) => degraded("set", key, &BackendError::from(e)),
            }
        }
        self.local.set(key, entry.clone());
        tracing::debug!(key, backend = MemoryStore::NAME, "cached recipe");
    }

    /// An entry from the shared backend, or else from the local store.
    ///
    /// The local store is consulted even when the backend is healthy, so
    /// entries written during an outage stay visible.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        if let Some(backend) = &self.backend {
            match backend.get(&backend_key(key)).await {
                Ok(Some(value)) => match serde_json::from_str::<CacheEntry>(&value) {
                    Ok(entry) => return Some(entry),
                    Err(e) => degraded("get", key, &BackendError::from(e)),
                },
                Ok(None) => {}
                Err(e) => degraded("get", key, &e),
            }
        }
        self.local.get(key)
    }

    /// All cached keys without the backend prefix, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = self.local.keys().into_iter().collect();

        if let Some(backend) = &self.backend {
            match backend.keys(&format!("{}*", KEY_PREFIX)).await {
                Ok(backend_keys) => keys.extend(
                    backend_keys
                        .iter()
                        .map(|k| k.strip_prefix(KEY_PREFIX).unwrap_or(k).to_string()),
                ),
                Err(e) => degraded("keys", "*", &e),
            }
        }

        keys.into_iter().collect()
    }

    /// Remove a key everywhere. Removing a missing key is not an error.
    pub async fn delete(&self, key: &str) {
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.delete(&backend_key(key)).await {
                degraded("delete", key, &e);
            }
        }
        self.local.delete(key);
    }

    /// Drop everything held in the local store.
    pub fn clear_local(&self) {
        self.local.clear();
    }
}

fn backend_key(key: &str) -> String {
    format!("{}{}", KEY_PREFIX, key)
}

fn degraded(op: &str, key: &str, error: &BackendError) {
    tracing::warn!(op, key, error = %error, "cache backend failed, using local store");
}
