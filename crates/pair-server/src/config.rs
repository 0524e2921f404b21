//! Configuration for the pairing site.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration, built once at startup and threaded into each
/// component constructor.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Multi-device gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Access gate configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Pairing session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Multi-device gateway REST API URL
    #[serde(default = "default_gateway_api_url")]
    pub api_url: String,

    /// Poll interval for session events
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret protecting the pairing pages. Empty disables the gate
    /// entirely, leaving the site open to anyone who can reach it; set a
    /// key in any real deployment.
    #[serde(default)]
    pub access_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the linked account's credential documents
    #[serde(default = "default_session_dir")]
    pub dir: PathBuf,

    /// How long a pairing session stays open before forced teardown
    #[serde(default = "default_pairing_timeout", with = "humantime_serde")]
    pub pairing_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: default_gateway_api_url(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: default_session_dir(),
            pairing_timeout: default_pairing_timeout(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_gateway_api_url() -> String {
    "http://wa-gateway:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_session_dir() -> PathBuf {
    PathBuf::from("./wa-session")
}

fn default_pairing_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_global_rpm() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables (e.g. `SERVER__PORT`,
    /// `AUTH__ACCESS_KEY`, `SESSION__PAIRING_TIMEOUT=5m`).
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
