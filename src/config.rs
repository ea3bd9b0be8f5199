use crate::constants::{cache, net};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    /// Backend the environment points at when no base URL is given
    pub fn default_base_url(self) -> &'static str {
        match self {
            Environment::Dev => net::DEV_BASE_URL,
            Environment::Prod => net::PROD_BASE_URL,
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(anyhow!("Invalid environment '{s}'. Valid options: dev, prod")),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

/// Client connection options.
///
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Args, Debug, Clone, Default)]
pub struct CliArgs {
    /// Path to a TOML config file
    #[arg(long, env = "BFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend environment: dev or prod
    #[arg(long = "env", env = "BFF_ENV", value_parser = clap::value_parser!(Environment))]
    pub environment: Option<Environment>,

    /// Backend base URL (overrides the environment preset)
    #[arg(long, env = "BFF_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds (1000-60000)
    #[arg(long, env = "BFF_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Cache generation tag; changing it drops every cached entry
    #[arg(long, env = "BFF_CACHE_GENERATION")]
    pub cache_generation: Option<String>,

    /// Path to the SQLite offline cache
    #[arg(long, env = "BFF_CACHE_DB")]
    pub cache_db: Option<String>,

    /// Health probe interval in milliseconds (1000-3600000)
    #[arg(long, env = "BFF_HEALTH_INTERVAL_MS")]
    pub health_interval_ms: Option<u64>,
}

/// Color tokens carried for the UI layer. The client never reads them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTokens {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub card_background: String,
}

impl Default for ColorTokens {
    fn default() -> Self {
        Self {
            primary: "#e91e63".into(),
            secondary: "#f8bbd0".into(),
            background: "#f5f5f5".into(),
            card_background: "#FCE4EC".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    client: ClientSection,
    colors: Option<ColorTokens>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientSection {
    environment: Option<String>,
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    cache_generation: Option<String>,
    cache_db: Option<String>,
    health_interval_ms: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub base_url: String,
    pub timeout_ms: u64,
    pub cache_generation: String,
    pub cache_db_path: String,
    pub health_interval_ms: u64,
    pub colors: ColorTokens,
}

impl Config {
    /// Defaults pointed at `base_url`. Used by tests and embedders that
    /// skip CLI parsing.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            environment: Environment::Dev,
            base_url: base_url.into(),
            timeout_ms: net::DEFAULT_TIMEOUT_MS,
            cache_generation: cache::DEFAULT_GENERATION.to_string(),
            cache_db_path: cache::DEFAULT_DB_PATH.to_string(),
            health_interval_ms: net::DEFAULT_HEALTH_INTERVAL_MS,
            colors: ColorTokens::default(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_cache_generation(mut self, generation: impl Into<String>) -> Self {
        self.cache_generation = generation.into();
        self
    }

    /// Check every field against its documented range
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.base_url, "BFF_BASE_URL")?;
        validate_in_range(
            self.timeout_ms,
            net::MIN_TIMEOUT_MS,
            net::MAX_TIMEOUT_MS,
            "BFF_TIMEOUT_MS",
        )?;
        validate_in_range(
            self.health_interval_ms,
            net::MIN_HEALTH_INTERVAL_MS,
            net::MAX_HEALTH_INTERVAL_MS,
            "BFF_HEALTH_INTERVAL_MS",
        )?;
        if self.cache_generation.trim().is_empty() {
            return Err(anyhow!("BFF_CACHE_GENERATION cannot be empty"));
        }
        Ok(())
    }

    /// Print current configuration (useful for debugging)
    pub fn print_summary(&self) {
        eprintln!("BFF client configuration:");
        eprintln!("  Environment: {}", self.environment);
        eprintln!("  Base URL: {}", self.base_url);
        eprintln!("  Timeout: {}ms", self.timeout_ms);
        eprintln!("  Cache generation: {}", self.cache_generation);
        eprintln!("  Cache DB: {}", self.cache_db_path);
        eprintln!("  Health interval: {}ms", self.health_interval_ms);
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

fn load_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

/// Build a validated configuration from parsed CLI/env args plus the optional
/// config file they point at.
pub fn load(args: CliArgs) -> Result<Config> {
    let file = match &args.config {
        Some(path) => {
            log::info!("[config] loading {}", path.display());
            load_file(path)?
        }
        None => ConfigFile::default(),
    };
    resolve(args, file)
}

fn resolve(args: CliArgs, file: ConfigFile) -> Result<Config> {
    let environment = match args.environment {
        Some(env) => env,
        None => file
            .client
            .environment
            .as_deref()
            .map(str::parse::<Environment>)
            .transpose()?
            .unwrap_or(Environment::Dev),
    };

    let base_url = args
        .base_url
        .or(file.client.base_url)
        .unwrap_or_else(|| environment.default_base_url().to_string());

    let config = Config {
        environment,
        base_url,
        timeout_ms: args
            .timeout_ms
            .or(file.client.timeout_ms)
            .unwrap_or(net::DEFAULT_TIMEOUT_MS),
        cache_generation: args
            .cache_generation
            .or(file.client.cache_generation)
            .unwrap_or_else(|| cache::DEFAULT_GENERATION.to_string()),
        cache_db_path: args
            .cache_db
            .or(file.client.cache_db)
            .unwrap_or_else(|| cache::DEFAULT_DB_PATH.to_string()),
        health_interval_ms: args
            .health_interval_ms
            .or(file.client.health_interval_ms)
            .unwrap_or(net::DEFAULT_HEALTH_INTERVAL_MS),
        colors: file.colors.unwrap_or_default(),
    };

    config.validate()?;
    Ok(config)
}
