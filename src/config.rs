use crate::error::{BridgeError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    500
}

fn default_tls_verify() -> bool {
    true
}

/// Immutable per-process bridge configuration.
///
/// `max_retries` counts TOTAL delivery attempts, including the first; the
/// backoff delay before attempt N (N >= 2) is `retry_base_ms * (N - 1)`.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Upstream endpoint URL receiving each JSON-RPC POST.
    pub endpoint: String,
    /// Bearer credential sent on every request.
    pub auth_token: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base unit for linear retry backoff.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,
    /// Pre-seeded session id; normally learned from the first upstream reply.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl BridgeConfig {
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            tls_verify: default_tls_verify(),
            session_id: None,
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| BridgeError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config: BridgeConfig = toml::from_str(&contents)
            .map_err(|e| BridgeError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Allow environment variables to override file config
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var("MCP_BRIDGE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(token) = env::var("MCP_BRIDGE_TOKEN") {
            self.auth_token = token;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(BridgeError::ConfigError("Endpoint is empty".to_string()));
        }

        if let Err(e) = reqwest::Url::parse(&self.endpoint) {
            return Err(BridgeError::ConfigError(format!(
                "Invalid endpoint URL '{}': {}",
                self.endpoint, e
            )));
        }

        if self.auth_token.is_empty() {
            return Err(BridgeError::ConfigError("Auth token is empty".to_string()));
        }

        if self.timeout_ms == 0 {
            return Err(BridgeError::ConfigError(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(BridgeError::ConfigError(
                "Max retries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_base(&self) -> Duration {
        Duration::from_millis(self.retry_base_ms)
    }
}
