//! Key/TTL cache owned by the host.
//!
//! Plugins only see the [`CacheStore`] trait. [`MemoryCache`] is the
//! in-process implementation used by the reference runtime and in tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Options for [`CacheStore::set`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheOptions {
    /// Time-to-live. `None` keeps the entry until it is deleted.
    pub expires: Option<Duration>,
}

impl CacheOptions {
    pub fn expires_in(ttl: Duration) -> Self {
        Self { expires: Some(ttl) }
    }
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the value stored under `key` if present and unexpired.
    async fn get(&self, key: &str) -> Option<Value>;

    async fn set(&self, key: &str, value: Value, options: CacheOptions) -> crate::Result<()>;

    async fn delete(&self, key: &str) -> crate::Result<()>;
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// In-memory cache with per-entry expiry.
///
/// Time is read from `tokio::time::Instant`, so tests running on a paused
/// clock can step over a TTL deterministically.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict `key` if it was expired at `now`, re-checked under the write
    /// lock. An entry written after `now` is returned instead.
    fn evict_expired(&self, key: &str, now: Instant) -> Option<Value> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: drop it so the map does not grow without bound.
        self.evict_expired(key, now)
    }

    async fn set(&self, key: &str, value: Value, options: CacheOptions) -> crate::Result<()> {
        let expires_at = options.expires.map(|ttl| Instant::now() + ttl);
        self.entries
            .write()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> crate::Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
