//! bff-client - resilient data client for the Breast Friend Forever app
//!
//! This library fronts the app's REST backend. Callers ask for data by
//! operation (hospitals, resources, chat, ...) and always get a usable,
//! canonically shaped answer back, whether from the network, the offline
//! cache, or static fallback data.
//!
//! ## Architecture
//!
//! - **endpoints**: operation name to URL
//! - **transport**: one HTTP attempt with a timeout and classified errors
//! - **cache**: CACHE_FIRST / NETWORK_FIRST offline cache, generation-tagged
//! - **normalize**: payload shape detection and field precedence per record kind
//! - **fallback**: static datasets
//! - **health**: connectivity probe and state
//! - **client**: the façade tying them together
//!
//! ## Usage
//!
//! ```no_run
//! # async fn demo() -> bff_client::error::Result<()> {
//! use bff_client::{BffClient, Config, HospitalFilter};
//!
//! let client = BffClient::connect(Config::for_base_url("http://127.0.0.1:8000")).await?;
//! let hospitals = client.get_hospitals(&HospitalFilter::default()).await?;
//! println!("{} hospitals ({:?})", hospitals.data.len(), hospitals.source);
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod error;

// Configuration (CLI/env/file layering)
pub mod config;

pub mod endpoints;
pub mod record;
pub mod transport;

pub mod fallback;
pub mod normalize;

pub mod cache;
pub mod health;

pub mod client;

pub use client::{BffClient, DataSource, Fetched, HospitalFilter};
pub use config::Config;
pub use error::{ClientError, ErrorKind};
pub use record::{CanonicalRecord, ChatReply, MobileFeatures, RecordKind};
