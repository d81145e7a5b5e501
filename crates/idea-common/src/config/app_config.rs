//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub idea: IdeaConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Idea lifecycle tuning
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdeaConfig {
    /// Capacity of the in-memory deadline window
    #[serde(default = "default_deadline_window")]
    pub deadline_window: usize,
    /// Upper bound on concurrent workers during the expired sweep
    #[serde(default = "default_sweep_max_workers")]
    pub sweep_max_workers: usize,
    /// Capacity of the cache of message ids known to carry no idea
    #[serde(default = "default_negative_cache_capacity")]
    pub negative_cache_capacity: u64,
    #[serde(default = "default_repo_timeout_ms")]
    pub repo_timeout_ms: u64,
    /// Timeout of window refills and the expired cursor
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_platform_timeout_ms")]
    pub platform_timeout_ms: u64,
    #[serde(default = "default_notice_lifetime_secs")]
    pub notice_lifetime_secs: u64,
    /// Delay before a failed window refill is retried
    #[serde(default = "default_refill_retry_secs")]
    pub refill_retry_secs: u64,
}

impl Default for IdeaConfig {
    fn default() -> Self {
        Self {
            deadline_window: default_deadline_window(),
            sweep_max_workers: default_sweep_max_workers(),
            negative_cache_capacity: default_negative_cache_capacity(),
            repo_timeout_ms: default_repo_timeout_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            platform_timeout_ms: default_platform_timeout_ms(),
            notice_lifetime_secs: default_notice_lifetime_secs(),
            refill_retry_secs: default_refill_retry_secs(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "idea-board".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_deadline_window() -> usize {
    50
}

fn default_sweep_max_workers() -> usize {
    10_000
}

fn default_negative_cache_capacity() -> u64 {
    10_000
}

fn default_repo_timeout_ms() -> u64 {
    2_000
}

fn default_query_timeout_ms() -> u64 {
    3_000
}

fn default_platform_timeout_ms() -> u64 {
    5_000
}

fn default_notice_lifetime_secs() -> u64 {
    15
}

fn default_refill_retry_secs() -> u64 {
    30
}

/// Parse an optional variable, rejecting values that are set but malformed
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: fn() -> T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `DATABASE_URL` is missing or a variable is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("APP_ENV") {
            Some(raw) => {
                Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?
            }
            None => Environment::default(),
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_var(&lookup, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            idea: IdeaConfig::from_lookup(&lookup)?,
        })
    }
}

impl IdeaConfig {
    /// Load only the idea settings from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            deadline_window: parse_var(lookup, "IDEA_DEADLINE_WINDOW", default_deadline_window)?,
            sweep_max_workers: parse_var(lookup, "IDEA_SWEEP_MAX_WORKERS", default_sweep_max_workers)?,
            negative_cache_capacity: parse_var(
                lookup,
                "IDEA_NEGATIVE_CACHE_CAPACITY",
                default_negative_cache_capacity,
            )?,
            repo_timeout_ms: parse_var(lookup, "IDEA_REPO_TIMEOUT_MS", default_repo_timeout_ms)?,
            query_timeout_ms: parse_var(lookup, "IDEA_QUERY_TIMEOUT_MS", default_query_timeout_ms)?,
            platform_timeout_ms: parse_var(
                lookup,
                "IDEA_PLATFORM_TIMEOUT_MS",
                default_platform_timeout_ms,
            )?,
            notice_lifetime_secs: parse_var(
                lookup,
                "IDEA_NOTICE_LIFETIME_SECS",
                default_notice_lifetime_secs,
            )?,
            refill_retry_secs: parse_var(lookup, "IDEA_REFILL_RETRY_SECS", default_refill_retry_secs)?,
        };

        if config.deadline_window == 0 {
            return Err(ConfigError::InvalidValue("IDEA_DEADLINE_WINDOW", "0".to_string()));
        }
        if config.sweep_max_workers == 0 {
            return Err(ConfigError::InvalidValue("IDEA_SWEEP_MAX_WORKERS", "0".to_string()));
        }

        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
