//! HTTP transport with timeout and error classification.
//!
//! A transport never retries. Callers see exactly one of three failure kinds:
//! `Timeout`, `Network`, or `HttpStatus` (non-2xx, with the parsed body when
//! there is one).

use crate::endpoints::Method;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedTransport;

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }

    /// Cache identity: method + URL
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<RawResponse>;

    /// Upper bound on a single `send`
    fn timeout(&self) -> Duration;
}

/// `reqwest`-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    async fn send_inner(&self, request: &Request) -> Result<RawResponse> {
        let mut rb = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        rb = rb
            .header("Content-Type", "application/json")
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            rb = rb.json(body);
        }

        let res = rb.send().await.map_err(|e| self.classify(&request.url, e))?;
        let status = res.status();
        let bytes = res.bytes().await.map_err(|e| self.classify(&request.url, e))?;
        let body = parse_body(&bytes);

        log::debug!("[transport] {} {} -> {}", request.method, request.url, status.as_u16());

        if status.is_success() {
            Ok(RawResponse {
                status: status.as_u16(),
                body: body.unwrap_or(Value::Null),
            })
        } else {
            Err(ClientError::HttpStatus {
                url: request.url.clone(),
                status: status.as_u16(),
                body,
            })
        }
    }

    fn classify(&self, url: &str, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ClientError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// JSON when it parses, the raw text otherwise, `None` for an empty body
fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(v) => Some(v),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse> {
        log::debug!("[transport] {} {}", request.method, request.url);
        // The outer bound covers body reads too; a late response is dropped
        // along with the future.
        match tokio::time::timeout(self.timeout, self.send_inner(request)).await {
            Ok(res) => res,
            Err(_) => Err(ClientError::Timeout {
                url: request.url.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(any(test, feature = "test-util"))]
mod scripted {
    use super::{RawResponse, Request, Transport};
    use crate::error::{ClientError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-process transport that replays canned results per URL and counts calls.
    ///
    /// Lets tests observe how many network calls an operation made. Unmatched
    /// URLs fail with `Network`.
    #[derive(Default)]
    pub struct ScriptedTransport {
        routes: Mutex<HashMap<String, Result<RawResponse>>>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer every request for `url` with `result` until replaced
        pub fn respond(&self, url: impl Into<String>, result: Result<RawResponse>) {
            if let Ok(mut routes) = self.routes.lock() {
                routes.insert(url.into(), result);
            }
        }

        /// Make `url` fail with a connection error
        pub fn fail(&self, url: impl Into<String>) {
            let url = url.into();
            let err = ClientError::Network {
                url: url.clone(),
                message: "connection refused".into(),
            };
            self.respond(url, Err(err));
        }

        pub fn calls(&self, url: &str) -> usize {
            self.calls
                .lock()
                .map(|c| c.get(url).copied().unwrap_or(0))
                .unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.calls.lock().map(|c| c.values().sum()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &Request) -> Result<RawResponse> {
            if let Ok(mut calls) = self.calls.lock() {
                *calls.entry(request.url.clone()).or_insert(0) += 1;
            }
            let routed = self
                .routes
                .lock()
                .ok()
                .and_then(|r| r.get(&request.url).cloned());
            routed.unwrap_or_else(|| {
                Err(ClientError::Network {
                    url: request.url.clone(),
                    message: "no route".into(),
                })
            })
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(crate::constants::net::DEFAULT_TIMEOUT_MS)
        }
    }
}
