//! Application configuration structs
//!
//! Loads configuration from environment variables (with optional `.env`).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
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
}

/// Gateway server and connection tuning
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Interval between keepalive pings, milliseconds
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
    /// Read loop errors out after this long without any inbound traffic
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Bound on each individual socket write
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
    /// Per-session outbound mailbox capacity
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Shared broadcast intent queue capacity
    #[serde(default = "default_intent_queue_capacity")]
    pub intent_queue_capacity: usize,
}

impl GatewayConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
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

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "parley".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_keepalive_interval_ms() -> u64 {
    45_000
}

fn default_read_timeout_ms() -> u64 {
    90_000
}

fn default_write_timeout_ms() -> u64 {
    10_000
}

fn default_mailbox_capacity() -> usize {
    100
}

fn default_intent_queue_capacity() -> usize {
    100
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            gateway: GatewayConfig {
                host: env::var("GATEWAY_HOST").unwrap_or_else(|_| default_host()),
                port: parse_env("GATEWAY_PORT", default_port()),
                keepalive_interval_ms: parse_env(
                    "GATEWAY_KEEPALIVE_INTERVAL_MS",
                    default_keepalive_interval_ms(),
                ),
                read_timeout_ms: parse_env("GATEWAY_READ_TIMEOUT_MS", default_read_timeout_ms()),
                write_timeout_ms: parse_env("GATEWAY_WRITE_TIMEOUT_MS", default_write_timeout_ms()),
                mailbox_capacity: parse_env("GATEWAY_MAILBOX_CAPACITY", default_mailbox_capacity()),
                intent_queue_capacity: parse_env(
                    "GATEWAY_INTENT_QUEUE_CAPACITY",
                    default_intent_queue_capacity(),
                ),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", default_max_connections()),
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", default_min_connections()),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: parse_env(
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    default_access_token_expiry(),
                ),
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_env("SNOWFLAKE_WORKER_ID", 0),
            },
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}
