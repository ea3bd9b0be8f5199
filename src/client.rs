//! The client façade UI callers talk to.
//!
//! Every operation returns usable data. Transport failures turn into a cached
//! copy or static defaults, and the result says which one it got. The only
//! error that reaches the caller is `UnknownOperation`.

use crate::cache::{CacheStore, MemoryStore, OfflineCache, ResponseOrigin};
use crate::config::Config;
use crate::constants::messages;
use crate::endpoints::{ops, EndpointRegistry, ResolvedEndpoint};
use crate::error::{ClientError, Result};
use crate::fallback;
use crate::health::{ConnectivityState, HealthMonitor};
use crate::normalize::{normalize_chat, normalize_features, Normalizer};
use crate::record::{CanonicalRecord, ChatReply, MobileFeatures, RecordKind};
use crate::transport::{HttpTransport, Request, Transport};
use serde_json::{json, Value};
use std::sync::Arc;

/// Where the data in a [`Fetched`] came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Network,
    Cache,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    fn new(data: T, source: DataSource) -> Self {
        Self { data, source }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

/// Optional hospital search filters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HospitalFilter {
    pub city: Option<String>,
    pub state: Option<String>,
}

/// A body that came back from network or cache; `None` when nothing usable did
struct Loaded {
    body: Option<Value>,
    source: DataSource,
}

pub struct BffClient {
    config: Config,
    registry: EndpointRegistry,
    transport: Arc<dyn Transport>,
    cache: OfflineCache,
    health: HealthMonitor,
    normalizer: Normalizer,
}

impl BffClient {
    /// HTTP transport with an in-memory cache
    pub async fn connect(config: Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.timeout_ms)?);
        Self::with_parts(config, transport, Arc::new(MemoryStore::new()), Normalizer::new()).await
    }

    /// HTTP transport with the SQLite cache at `config.cache_db_path`
    #[cfg(feature = "native")]
    pub async fn open_persistent(config: Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.timeout_ms)?);
        let store = Arc::new(crate::cache::SqliteStore::open(&config.cache_db_path).await?);
        Self::with_parts(config, transport, store, Normalizer::new()).await
    }

    pub async fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CacheStore>,
        normalizer: Normalizer,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        let registry = EndpointRegistry::new(&config.base_url)?;
        let health_url = registry.resolve(ops::CHECK_HEALTH)?.url;
        let health = HealthMonitor::new(transport.clone(), health_url);
        let cache = OfflineCache::open(store, config.cache_generation.clone()).await;

        log::info!(
            "[client] ready: {} ({}), cache {}",
            registry.base_url(),
            config.environment,
            cache.namespace()
        );

        Ok(Self {
            config,
            registry,
            transport,
            cache,
            health,
            normalizer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &OfflineCache {
        &self.cache
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.health.state()
    }

    /// Connectivity probe; bypasses the cache and never fails
    pub async fn check_health(&self) -> bool {
        self.health.check_health().await
    }

    pub async fn send_chat_message(&self, text: &str) -> Result<Fetched<ChatReply>> {
        let endpoint = self.registry.resolve(ops::SEND_CHAT_MESSAGE)?;
        let body = json!({
            "message": text,
            "conversation_id": messages::ANONYMOUS_CONVERSATION,
        });
        let loaded = self.load(&endpoint, Some(body)).await;
        Ok(match loaded.body {
            Some(body) => Fetched::new(normalize_chat(&body, messages::CHAT_FALLBACK), loaded.source),
            None => {
                log::warn!("[client] chat unavailable, using offline reply");
                Fetched::new(fallback::default_chat_reply(), DataSource::Fallback)
            }
        })
    }

    pub async fn get_chat_greeting(&self) -> Result<Fetched<ChatReply>> {
        let endpoint = self.registry.resolve(ops::GET_CHAT_GREETING)?;
        let loaded = self.load(&endpoint, None).await;
        Ok(match loaded.body {
            Some(body) => {
                Fetched::new(normalize_chat(&body, messages::GREETING_FALLBACK), loaded.source)
            }
            None => Fetched::new(fallback::default_greeting(), DataSource::Fallback),
        })
    }

    pub async fn get_hospitals(&self, filter: &HospitalFilter) -> Result<Fetched<Vec<CanonicalRecord>>> {
        let endpoint = self.registry.resolve(ops::GET_HOSPITALS)?.with_query(&[
            ("city", filter.city.as_deref()),
            ("state", filter.state.as_deref()),
        ]);
        Ok(self.records(&endpoint, RecordKind::Hospital).await)
    }

    pub async fn get_resources(&self) -> Result<Fetched<Vec<CanonicalRecord>>> {
        self.fetch_records(ops::GET_RESOURCES, RecordKind::Resource).await
    }

    pub async fn get_encouragement(&self) -> Result<Fetched<Vec<CanonicalRecord>>> {
        self.fetch_records(ops::GET_ENCOURAGEMENT, RecordKind::Encouragement)
            .await
    }

    pub async fn get_self_exam_steps(&self) -> Result<Fetched<Vec<CanonicalRecord>>> {
        self.fetch_records(ops::GET_SELF_EXAM_STEPS, RecordKind::SelfExamStep)
            .await
    }

    pub async fn get_mobile_features(&self) -> Result<Fetched<MobileFeatures>> {
        let endpoint = self.registry.resolve(ops::GET_MOBILE_FEATURES)?;
        let loaded = self.load(&endpoint, None).await;
        let features = loaded
            .body
            .as_ref()
            .and_then(normalize_features)
            .map(|f| Fetched::new(f, loaded.source));
        Ok(features.unwrap_or_else(|| {
            log::warn!("[client] no feature descriptor, using defaults");
            Fetched::new(fallback::default_mobile_features(), DataSource::Fallback)
        }))
    }

    /// Share an encouragement message. `kind` defaults to general support.
    ///
    /// When the post cannot be delivered the returned record is built
    /// locally and carries `pending: true`.
    pub async fn post_encouragement(
        &self,
        message: &str,
        kind: Option<&str>,
    ) -> Result<Fetched<CanonicalRecord>> {
        let endpoint = self.registry.resolve(ops::POST_ENCOURAGEMENT)?;
        let sent = json!({
            "message": message,
            "type": kind.unwrap_or(messages::DEFAULT_ENCOURAGEMENT_TYPE),
        });
        let loaded = self.load(&endpoint, Some(sent.clone())).await;

        Ok(match loaded.body {
            Some(echo) => {
                let raw = merge_echo(sent, &echo);
                Fetched::new(
                    self.normalizer.normalize_one(&raw, RecordKind::Encouragement),
                    loaded.source,
                )
            }
            None => {
                log::warn!("[client] encouragement not delivered, keeping it pending");
                let mut raw = sent;
                raw["timestamp"] = Value::from(chrono::Utc::now().to_rfc3339());
                let mut record = self.normalizer.normalize_one(&raw, RecordKind::Encouragement);
                record.insert("pending", Value::Bool(true));
                Fetched::new(record, DataSource::Fallback)
            }
        })
    }

    /// Fetch and normalise the record list behind `operation`
    pub async fn fetch_records(
        &self,
        operation: &str,
        kind: RecordKind,
    ) -> Result<Fetched<Vec<CanonicalRecord>>> {
        let endpoint = self.registry.resolve(operation)?;
        Ok(self.records(&endpoint, kind).await)
    }

    async fn records(&self, endpoint: &ResolvedEndpoint, kind: RecordKind) -> Fetched<Vec<CanonicalRecord>> {
        let loaded = self.load(endpoint, None).await;
        let records = loaded
            .body
            .as_ref()
            .map(|body| self.normalizer.normalize(body, kind))
            .unwrap_or_default();

        if records.is_empty() {
            log::warn!("[client] no {kind} records from {}, using defaults", endpoint.url);
            return Fetched::new(fallback::defaults_for(kind), DataSource::Fallback);
        }
        log::debug!("[client] {} {kind} records ({:?})", records.len(), loaded.source);
        Fetched::new(records, loaded.source)
    }

    /// One request through the cache. Failures and the offline stub come back
    /// as an empty body.
    async fn load(&self, endpoint: &ResolvedEndpoint, body: Option<Value>) -> Loaded {
        let request = Request {
            method: endpoint.method(),
            url: endpoint.url.clone(),
            body,
        };
        match self
            .cache
            .fetch_with_policy(&request, endpoint.cache_policy(), self.transport.as_ref())
            .await
        {
            Ok(res) => match res.origin {
                ResponseOrigin::Network => Loaded {
                    body: Some(res.body),
                    source: DataSource::Network,
                },
                ResponseOrigin::Cache => Loaded {
                    body: Some(res.body),
                    source: DataSource::Cache,
                },
                ResponseOrigin::OfflineStub => Loaded {
                    body: None,
                    source: DataSource::Fallback,
                },
            },
            Err(e) => {
                log::warn!("[client] {} failed: {e}", endpoint.descriptor.operation_name);
                Loaded {
                    body: None,
                    source: DataSource::Fallback,
                }
            }
        }
    }
}

/// Fields the server echoed win over what was sent. A `data` object is
/// unwrapped first.
fn merge_echo(mut sent: Value, echo: &Value) -> Value {
    let echoed = match echo.get("data") {
        Some(inner @ Value::Object(_)) => inner,
        _ => echo,
    };
    if let (Some(target), Some(source)) = (sent.as_object_mut(), echoed.as_object()) {
        for (k, v) in source {
            if !v.is_null() {
                target.insert(k.clone(), v.clone());
            }
        }
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_echo_and_unwraps_data() {
        let sent = json!({"message": "hi", "type": "t"});
        let merged = merge_echo(sent.clone(), &json!({"data": {"id": 7, "type": null}}));
        assert_eq!(merged, json!({"message": "hi", "type": "t", "id": 7}));

        let merged = merge_echo(sent, &json!({"id": 3, "message": "HI"}));
        assert_eq!(merged["message"], "HI");
        assert_eq!(merged["id"], 3);
    }
}
