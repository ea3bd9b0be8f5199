//! Offline cache in front of the transport.
//!
//! Static assets are CACHE_FIRST, API data (any path with an `/api/`
//! segment) is NETWORK_FIRST.
//! Entries live in a generation-tagged namespace: opening the cache with a
//! new generation deletes every entry of the older ones. Non-GET requests are
//! never cached.

pub mod store;
#[cfg(feature = "native")]
pub mod sqlite;

pub use store::{CacheEntry, CachePolicy, CacheStore, MemoryStore};
#[cfg(feature = "native")]
pub use sqlite::SqliteStore;

use crate::constants::{cache as consts, messages};
use crate::endpoints::Method;
use crate::error::{ClientError, Result};
use crate::transport::{Request, Transport};
use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;

/// Where a cached fetch got its body from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseOrigin {
    Network,
    Cache,
    /// Synthesized offline body; no live or cached data existed
    OfflineStub,
}

#[derive(Clone, Debug)]
pub struct CachedResponse {
    pub body: Value,
    pub origin: ResponseOrigin,
    /// Network failure that forced a cache or stub answer
    pub error: Option<ClientError>,
}

impl CachedResponse {
    fn network(body: Value) -> Self {
        Self {
            body,
            origin: ResponseOrigin::Network,
            error: None,
        }
    }
}

pub struct OfflineCache {
    store: Arc<dyn CacheStore>,
    generation: String,
}

impl OfflineCache {
    /// Open the cache on `store` and activate `generation`, dropping every
    /// entry from other generations.
    pub async fn open(store: Arc<dyn CacheStore>, generation: impl Into<String>) -> Self {
        let cache = Self {
            store,
            generation: generation.into(),
        };
        match cache.store.delete_other_generations(&cache.generation).await {
            Ok(0) => {}
            Ok(n) => log::info!(
                "[cache] activated {}: dropped {n} stale entries",
                cache.namespace()
            ),
            Err(e) => log::error!("[cache] activation of {} failed: {e}", cache.namespace()),
        }
        cache
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Namespace label, e.g. `bff-v2.1.0`
    pub fn namespace(&self) -> String {
        format!("{}-{}", consts::NAMESPACE, self.generation)
    }

    /// NETWORK_FIRST for paths containing an `/api/` segment, CACHE_FIRST
    /// otherwise
    pub fn policy_for(url: &str) -> CachePolicy {
        if url_path(url).contains(consts::API_PATH_SEGMENT) {
            CachePolicy::NetworkFirst
        } else {
            CachePolicy::CacheFirst
        }
    }

    /// Body served for a NETWORK_FIRST miss while offline
    pub fn offline_response() -> Value {
        json!({
            "error": messages::OFFLINE_ERROR,
            "message": messages::OFFLINE_MESSAGE,
            "suggestions": messages::OFFLINE_SUGGESTIONS,
            "is_offline": true,
        })
    }

    /// Fetch through the cache.
    ///
    /// GETs only fail for a CACHE_FIRST miss whose network fetch fails;
    /// NETWORK_FIRST always resolves to network, cache, or the offline stub.
    /// Non-GET requests pass straight through.
    pub async fn fetch(&self, request: &Request, transport: &dyn Transport) -> Result<CachedResponse> {
        self.fetch_with_policy(request, Self::policy_for(&request.url), transport)
            .await
    }

    /// Like [`fetch`](Self::fetch), with the policy chosen by the caller
    /// instead of read off the URL.
    pub async fn fetch_with_policy(
        &self,
        request: &Request,
        policy: CachePolicy,
        transport: &dyn Transport,
    ) -> Result<CachedResponse> {
        if request.method != Method::Get {
            log::debug!("[cache] bypass {}", request.key());
            return transport
                .send(request)
                .await
                .map(|r| CachedResponse::network(r.body));
        }

        match policy {
            CachePolicy::CacheFirst => self.cache_first(request, transport).await,
            CachePolicy::NetworkFirst => Ok(self.network_first(request, transport).await),
        }
    }

    async fn cache_first(&self, request: &Request, transport: &dyn Transport) -> Result<CachedResponse> {
        let key = request.key();
        if let Some(entry) = self.lookup(&key).await {
            log::debug!("[cache] hit {key}");
            return Ok(CachedResponse {
                body: entry.body,
                origin: ResponseOrigin::Cache,
                error: None,
            });
        }

        let response = transport.send(request).await?;
        self.store_entry(key, response.body.clone(), CachePolicy::CacheFirst)
            .await;
        Ok(CachedResponse::network(response.body))
    }

    async fn network_first(&self, request: &Request, transport: &dyn Transport) -> CachedResponse {
        let key = request.key();
        match transport.send(request).await {
            Ok(response) => {
                self.store_entry(key, response.body.clone(), CachePolicy::NetworkFirst)
                    .await;
                CachedResponse::network(response.body)
            }
            Err(e) => match self.lookup(&key).await {
                Some(entry) => {
                    log::warn!(
                        "[cache] {e}; serving copy of {key} stored {}",
                        entry.stored_at.to_rfc3339()
                    );
                    CachedResponse {
                        body: entry.body,
                        origin: ResponseOrigin::Cache,
                        error: Some(e),
                    }
                }
                None => {
                    log::warn!("[cache] {e}; no copy of {key}, answering offline");
                    CachedResponse {
                        body: Self::offline_response(),
                        origin: ResponseOrigin::OfflineStub,
                        error: Some(e),
                    }
                }
            },
        }
    }

    /// Warm the cache with static assets. Failures are logged and skipped;
    /// returns how many assets are now cached.
    pub async fn precache(&self, urls: &[String], transport: &dyn Transport) -> usize {
        let fetches = urls.iter().map(|url| async move {
            let request = Request::get(url.clone());
            match self.cache_first(&request, transport).await {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("[cache] precache skipped {url}: {e}");
                    false
                }
            }
        });
        let cached = join_all(fetches).await.into_iter().filter(|ok| *ok).count();
        log::info!("[cache] precached {cached}/{} assets", urls.len());
        cached
    }

    /// Drop every entry of the current generation
    pub async fn invalidate_all(&self) -> Result<usize> {
        let n = self.store.clear_generation(&self.generation).await?;
        log::info!("[cache] invalidated {n} entries in {}", self.namespace());
        Ok(n)
    }

    pub async fn len(&self) -> Result<usize> {
        self.store.count(&self.generation).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Storage errors read as a miss
    async fn lookup(&self, key: &str) -> Option<CacheEntry> {
        match self.store.get(&self.generation, key).await {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("[cache] read {key} failed: {e}");
                None
            }
        }
    }

    async fn store_entry(&self, key: String, body: Value, policy: CachePolicy) {
        let entry = CacheEntry {
            key,
            generation: self.generation.clone(),
            body,
            stored_at: Utc::now(),
            policy,
        };
        if let Err(e) = self.store.put(entry).await {
            log::error!("[cache] write failed: {e}");
        }
    }
}

/// Path component of an absolute or relative URL
fn url_path(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(i) => {
            let after = &url[i + 3..];
            match after.find('/') {
                Some(j) => &after[j..],
                None => "/",
            }
        }
        None => url,
    };
    rest.split(['?', '#']).next().unwrap_or(rest)
}
