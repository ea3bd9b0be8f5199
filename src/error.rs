//! Error taxonomy for the data client.
//!
//! Transport failures (`Timeout`, `Network`, `HttpStatus`) are caught at the
//! façade and turned into a fallback decision. `UnknownOperation` is a caller
//! bug and is the only variant the façade lets through.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("http {status} from {url}")]
    HttpStatus {
        url: String,
        status: u16,
        body: Option<Value>,
    },

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cache storage error: {0}")]
    Storage(String),
}

/// Fieldless mirror of [`ClientError`] for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Network,
    HttpStatus,
    UnknownOperation,
    InvalidConfig,
    Storage,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Timeout { .. } => ErrorKind::Timeout,
            ClientError::Network { .. } => ErrorKind::Network,
            ClientError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ClientError::UnknownOperation(_) => ErrorKind::UnknownOperation,
            ClientError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            ClientError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// True for the three errors a Transport can produce.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Timeout | ErrorKind::Network | ErrorKind::HttpStatus
        )
    }
}

#[cfg(feature = "native")]
impl From<rusqlite::Error> for ClientError {
    fn from(e: rusqlite::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}
