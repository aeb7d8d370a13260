//! Configuration management for fleetdrop
//!
//! Supports configuration via:
//! - Environment variables (primary)
//! - Optional TOML config file (secondary)
//!
//! Environment variables take precedence over config file values. Note
//! that storage credentials are never configuration: they are uploaded by
//! the user through the API, per session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max upload body size in bytes (default: 64MB)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_bind_address() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_upload_size() -> usize {
    64 * 1024 * 1024 // 64MB
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_server() -> ServerConfig {
    ServerConfig {
        bind_address: default_bind_address(),
        timeout_secs: default_timeout_secs(),
        max_upload_size: default_max_upload_size(),
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - FLEETDROP_BIND_ADDRESS: server bind address (default: 0.0.0.0:8080)
    /// - FLEETDROP_TIMEOUT_SECS: request timeout (default: 60)
    /// - FLEETDROP_MAX_UPLOAD_SIZE: max upload size in bytes (default: 64MB)
    /// - FLEETDROP_LOG_LEVEL: log level (default: info)
    /// - FLEETDROP_CONFIG_FILE: optional path to TOML config file
    pub fn from_env() -> Result<Self> {
        // Try to load from config file first if specified
        let config_file = std::env::var("FLEETDROP_CONFIG_FILE").ok();
        let mut config = if let Some(path) = &config_file {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        // Override with environment variables
        if let Ok(addr) = std::env::var("FLEETDROP_BIND_ADDRESS") {
            config.server.bind_address =
                addr.parse().context("invalid FLEETDROP_BIND_ADDRESS")?;
        }

        if let Ok(timeout) = std::env::var("FLEETDROP_TIMEOUT_SECS") {
            config.server.timeout_secs =
                timeout.parse().context("invalid FLEETDROP_TIMEOUT_SECS")?;
        }

        if let Ok(size) = std::env::var("FLEETDROP_MAX_UPLOAD_SIZE") {
            config.server.max_upload_size =
                size.parse().context("invalid FLEETDROP_MAX_UPLOAD_SIZE")?;
        }

        if let Ok(level) = std::env::var("FLEETDROP_LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("unreadable config file {path}"))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("unparsable config file {path}"))?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.server.bind_address.port(), 8080);
        assert_eq!(config.server.timeout_secs, 60);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            log_level = "debug"

            [server]
            bind_address = "127.0.0.1:9090"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.server.bind_address.port(), 9090);
        assert_eq!(config.server.max_upload_size, 64 * 1024 * 1024);
    }
}
