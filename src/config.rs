// src/config.rs

//! Manages server and client configuration: defaults, the optional TOML file,
//! environment overrides and validation.

use crate::core::protocol::DEFAULT_READ_BUFFER_SIZE;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// Environment variable overriding the listen/connect host.
pub const HOST_ENV: &str = "SPINELCHAT_HOST";
/// Environment variable overriding the listen/connect port.
pub const PORT_ENV: &str = "SPINELCHAT_PORT";

/// Configuration for the Prometheus metrics exporter.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetricsConfig {
    /// If true, an HTTP server will be started to expose Prometheus metrics.
    #[serde(default)]
    pub enabled: bool,
    /// The port for the Prometheus metrics server.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

fn default_metrics_port() -> u16 {
    8879
}

/// The validated server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Connections beyond this many are turned away at accept time.
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// Upper bound of a single read. Longer input arrives as several messages.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    /// Payloads that may wait for a slow client before new ones are dropped.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    12345
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_clients() -> usize {
    10000
}
fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}
fn default_outbound_queue_capacity() -> usize {
    64
}
fn default_shutdown_timeout_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_clients: default_max_clients(),
            read_buffer_size: default_read_buffer_size(),
            outbound_queue_capacity: default_outbound_queue_capacity(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        info!("Loaded configuration from '{}'.", path);
        config.validate()?;
        Ok(config)
    }

    /// Applies `SPINELCHAT_HOST` / `SPINELCHAT_PORT` on top of the current values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        apply_overrides(
            &mut self.host,
            &mut self.port,
            std::env::var(HOST_ENV).ok(),
            std::env::var(PORT_ENV).ok(),
        )
    }

    /// Validates the configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.max_clients == 0 {
            return Err(anyhow!("max_clients cannot be 0"));
        }
        if self.read_buffer_size == 0 {
            return Err(anyhow!("read_buffer_size cannot be 0"));
        }
        if self.outbound_queue_capacity == 0 {
            return Err(anyhow!("outbound_queue_capacity cannot be 0"));
        }
        if self.read_buffer_size < DEFAULT_READ_BUFFER_SIZE {
            warn!(
                "read_buffer_size is {} bytes; messages longer than that will be split.",
                self.read_buffer_size
            );
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(anyhow!("metrics.port cannot be 0"));
            }
            if self.metrics.port == self.port {
                return Err(anyhow!(
                    "metrics.port cannot be the same as the main server port"
                ));
            }
        }
        Ok(())
    }
}

/// Settings for the interactive client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: default_port(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl ClientConfig {
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        apply_overrides(
            &mut self.host,
            &mut self.port,
            std::env::var(HOST_ENV).ok(),
            std::env::var(PORT_ENV).ok(),
        )
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn apply_overrides(
    host: &mut String,
    port: &mut u16,
    host_override: Option<String>,
    port_override: Option<String>,
) -> Result<()> {
    if let Some(h) = host_override.filter(|h| !h.trim().is_empty()) {
        *host = h;
    }
    if let Some(p) = port_override {
        *port = parse_port(&p)?;
    }
    Ok(())
}

/// Parses a non-zero TCP port.
pub fn parse_port(value: &str) -> Result<u16> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(anyhow!("Invalid port number: {value}")),
        Ok(port) => Ok(port),
    }
}
