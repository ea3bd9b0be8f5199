//! Cache entry storage.
//!
//! Stores are keyed by `(generation, request key)`. Entries are always
//! written whole; a `put` for an existing key replaces it.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CachePolicy {
    /// Serve the cached copy if present, otherwise fetch once and keep it
    CacheFirst,
    /// Always try the network; the cached copy is only a fallback
    NetworkFirst,
}

impl CachePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CachePolicy::CacheFirst => "CACHE_FIRST",
            CachePolicy::NetworkFirst => "NETWORK_FIRST",
        }
    }
}

impl std::fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CachePolicy {
    type Err = ClientError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CACHE_FIRST" => Ok(CachePolicy::CacheFirst),
            "NETWORK_FIRST" => Ok(CachePolicy::NetworkFirst),
            other => Err(ClientError::Storage(format!("unknown cache policy '{other}'"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Request identity: `"METHOD url"`
    pub key: String,
    pub generation: String,
    pub body: Value,
    pub stored_at: DateTime<Utc>,
    pub policy: CachePolicy,
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, generation: &str, key: &str) -> Result<Option<CacheEntry>>;

    async fn put(&self, entry: CacheEntry) -> Result<()>;

    /// Drop every entry not tagged `keep`; returns how many went
    async fn delete_other_generations(&self, keep: &str) -> Result<usize>;

    /// Drop every entry tagged `generation`; returns how many went
    async fn clear_generation(&self, generation: &str) -> Result<usize>;

    async fn count(&self, generation: &str) -> Result<usize>;
}

/// Process-local store. Share one instance (behind an `Arc`) between clients
/// to keep entries across client restarts.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<(String, String), CacheEntry>) -> T) -> Result<T> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| ClientError::Storage("memory store lock poisoned".into()))?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, generation: &str, key: &str) -> Result<Option<CacheEntry>> {
        self.with_entries(|e| e.get(&(generation.to_string(), key.to_string())).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.with_entries(|e| {
            e.insert((entry.generation.clone(), entry.key.clone()), entry);
        })
    }

    async fn delete_other_generations(&self, keep: &str) -> Result<usize> {
        self.with_entries(|e| {
            let before = e.len();
            e.retain(|(generation, _), _| generation == keep);
            before - e.len()
        })
    }

    async fn clear_generation(&self, generation: &str) -> Result<usize> {
        self.with_entries(|e| {
            let before = e.len();
            e.retain(|(g, _), _| g != generation);
            before - e.len()
        })
    }

    async fn count(&self, generation: &str) -> Result<usize> {
        self.with_entries(|e| e.keys().filter(|(g, _)| g == generation).count())
    }
}
