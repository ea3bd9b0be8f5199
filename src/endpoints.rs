//! Endpoint registry: logical operation names to absolute URLs.
//!
//! The table is static and complete at construction; nothing is registered at
//! runtime.

use crate::cache::CachePolicy;
use crate::constants::cache::API_PATH_SEGMENT;
use crate::error::{ClientError, Result};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation names exposed to callers
pub mod ops {
    pub const CHECK_HEALTH: &str = "checkHealth";
    pub const SEND_CHAT_MESSAGE: &str = "sendChatMessage";
    pub const GET_CHAT_GREETING: &str = "getChatGreeting";
    pub const GET_HOSPITALS: &str = "getHospitals";
    pub const GET_RESOURCES: &str = "getResources";
    pub const GET_ENCOURAGEMENT: &str = "getEncouragement";
    pub const POST_ENCOURAGEMENT: &str = "postEncouragement";
    pub const GET_SELF_EXAM_STEPS: &str = "getSelfExamSteps";
    pub const GET_MOBILE_FEATURES: &str = "getMobileFeatures";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub operation_name: &'static str,
    pub path_template: &'static str,
    pub method: Method,
}

impl EndpointDescriptor {
    /// API data is NETWORK_FIRST. Decided on the registry-relative path, so a
    /// base URL with its own path prefix does not change the answer.
    pub fn cache_policy(&self) -> CachePolicy {
        if self.path_template.starts_with(API_PATH_SEGMENT) {
            CachePolicy::NetworkFirst
        } else {
            CachePolicy::CacheFirst
        }
    }
}

const fn endpoint(
    operation_name: &'static str,
    method: Method,
    path_template: &'static str,
) -> EndpointDescriptor {
    EndpointDescriptor {
        operation_name,
        path_template,
        method,
    }
}

/// One canonical path per operation. Collection roots keep the trailing
/// slash the backend routers are mounted with.
pub const ENDPOINTS: &[EndpointDescriptor] = &[
    endpoint(ops::CHECK_HEALTH, Method::Get, "/health"),
    endpoint(ops::SEND_CHAT_MESSAGE, Method::Post, "/api/v1/chat/message"),
    endpoint(ops::GET_CHAT_GREETING, Method::Get, "/api/v1/chat/greeting"),
    endpoint(ops::GET_HOSPITALS, Method::Get, "/api/v1/hospitals/"),
    endpoint(ops::GET_RESOURCES, Method::Get, "/api/v1/resources/"),
    endpoint(ops::GET_ENCOURAGEMENT, Method::Get, "/api/v1/encouragement/"),
    endpoint(ops::POST_ENCOURAGEMENT, Method::Post, "/api/v1/encouragement/"),
    endpoint(ops::GET_SELF_EXAM_STEPS, Method::Get, "/api/v1/self_exam/steps"),
    endpoint(ops::GET_MOBILE_FEATURES, Method::Get, "/api/v1/mobile/"),
];

/// A descriptor joined with the configured base URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub descriptor: EndpointDescriptor,
    pub url: String,
}

impl ResolvedEndpoint {
    pub fn method(&self) -> Method {
        self.descriptor.method
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.descriptor.cache_policy()
    }

    /// Append URL-encoded query parameters, skipping `None` values
    pub fn with_query(mut self, params: &[(&str, Option<&str>)]) -> Self {
        let pairs: Vec<String> = params
            .iter()
            .filter_map(|(k, v)| v.map(|v| format!("{}={}", k, urlencoding::encode(v))))
            .collect();
        if !pairs.is_empty() {
            self.url.push(if self.url.contains('?') { '&' } else { '?' });
            self.url.push_str(&pairs.join("&"));
        }
        self
    }
}

#[derive(Clone, Debug)]
pub struct EndpointRegistry {
    base_url: String,
    by_name: HashMap<&'static str, EndpointDescriptor>,
}

impl EndpointRegistry {
    /// Registry over the built-in endpoint table
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_descriptors(base_url, ENDPOINTS)
    }

    /// Registry over an explicit table. Duplicate operation names are rejected.
    pub fn from_descriptors(base_url: &str, descriptors: &[EndpointDescriptor]) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(descriptors.len());
        for d in descriptors {
            if by_name.insert(d.operation_name, *d).is_some() {
                return Err(ClientError::InvalidConfig(format!(
                    "duplicate endpoint for operation '{}'",
                    d.operation_name
                )));
            }
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            by_name,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn descriptor(&self, operation_name: &str) -> Result<EndpointDescriptor> {
        self.by_name
            .get(operation_name)
            .copied()
            .ok_or_else(|| ClientError::UnknownOperation(operation_name.to_string()))
    }

    /// `base_url + path_template` for a known operation
    pub fn resolve(&self, operation_name: &str) -> Result<ResolvedEndpoint> {
        let descriptor = self.descriptor(operation_name)?;
        Ok(ResolvedEndpoint {
            descriptor,
            url: format!("{}{}", self.base_url, descriptor.path_template),
        })
    }

    pub fn operations(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }
}
