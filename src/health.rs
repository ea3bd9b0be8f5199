//! Backend reachability probe and the connectivity state it maintains.

use crate::constants::net::HEALTHY_MARKER;
use crate::transport::{RawResponse, Request, Transport};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Last known reachability of the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ConnectivityState {
    pub reachable: bool,
    /// `None` until the first probe completes
    pub last_checked: Option<DateTime<Utc>>,
}

/// Owns the connectivity state; the only writer to it.
pub struct HealthMonitor {
    transport: Arc<dyn Transport>,
    health_url: String,
    state: RwLock<ConnectivityState>,
}

impl HealthMonitor {
    pub fn new(transport: Arc<dyn Transport>, health_url: impl Into<String>) -> Self {
        Self {
            transport,
            health_url: health_url.into(),
            state: RwLock::new(ConnectivityState::default()),
        }
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    /// Probe the backend. Never fails: any transport error reads as
    /// unreachable.
    pub async fn check_health(&self) -> bool {
        let request = Request::get(self.health_url.clone());
        let outcome =
            tokio::time::timeout(self.transport.timeout(), self.transport.send(&request)).await;

        let reachable = match outcome {
            Ok(Ok(response)) => is_healthy(&response),
            Ok(Err(e)) => {
                log::warn!("[health] 🔴 backend unreachable: {e}");
                false
            }
            Err(_) => {
                log::warn!("[health] 🔴 probe timed out for {}", self.health_url);
                false
            }
        };

        self.record(reachable);
        reachable
    }

    /// Snapshot of the connectivity state
    pub fn state(&self) -> ConnectivityState {
        match self.state.read() {
            Ok(s) => *s,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.state().reachable
    }

    fn record(&self, reachable: bool) {
        let mut guard = match self.state.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.reachable != reachable || guard.last_checked.is_none() {
            log::info!(
                "[health] backend is {}",
                if reachable { "reachable" } else { "unreachable" }
            );
        }
        *guard = ConnectivityState {
            reachable,
            last_checked: Some(Utc::now()),
        };
    }

    /// Probe every `interval` until the future is dropped. Probes never
    /// overlap: the next one starts `interval` after the previous finished.
    pub async fn run_periodic(&self, interval: Duration) {
        log::info!(
            "[health] periodic probe started - {} every {}ms",
            self.health_url,
            interval.as_millis()
        );
        loop {
            self.check_health().await;
            tokio::time::sleep(interval).await;
        }
    }
}

/// 2xx with `status == "healthy"` in the body
fn is_healthy(response: &RawResponse) -> bool {
    (200..300).contains(&response.status)
        && response.body.get("status").and_then(|s| s.as_str()) == Some(HEALTHY_MARKER)
}
