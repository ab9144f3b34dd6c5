//! Relay configuration
//!
//! Loaded once at startup, in priority order:
//!
//! 1. Environment variables
//! 2. JSON configuration file (optional)
//! 3. Built-in defaults
//!
//! The stream name has no default and must come from the file or the
//! `StreamName` environment variable.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::sink::{
    Credentials, KinesisSinkConfig, KinesisStreamSink, MemoryStreamSink, SinkError, StreamSink,
};

/// Environment variable naming the target stream
pub const STREAM_NAME_ENV: &str = "StreamName";

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config: {0}")]
    Read(String),

    /// File is not valid configuration JSON
    #[error("Invalid config JSON: {0}")]
    Parse(String),

    /// A value is out of range or missing
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The sink could not be built
    #[error("Sink setup failed: {0}")]
    Sink(#[from] SinkError),
}

/// Complete relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Target stream (required)
    #[serde(default)]
    pub stream_name: String,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub sink: SinkConfig,

    /// Default tracing filter when `RUST_LOG` is unset (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            stream_name: String::new(),
            http: HttpServerConfig::default(),
            sink: SinkConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Which sink backs the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkConfig {
    /// Keep batches in process memory
    Memory,
    /// Kinesis-compatible service
    Kinesis(KinesisSettings),
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Kinesis(KinesisSettings::default())
    }
}

/// Kinesis sink settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinesisSettings {
    /// Region (default: "us-east-1")
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint override, e.g. a local emulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Per-call timeout in milliseconds (default: 10000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<String>,

    #[serde(default, skip_serializing)]
    pub session_token: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for KinesisSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
            timeout_ms: default_timeout_ms(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

impl KinesisSettings {
    fn credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                session_token: self.session_token.clone(),
            }),
            _ => None,
        }
    }

    fn to_sink_config(&self) -> KinesisSinkConfig {
        KinesisSinkConfig {
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            credentials: self.credentials(),
        }
    }
}

impl RelayConfig {
    /// Load from an optional file, then the process environment
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file without validating it
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from an environment-style lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(stream_name) = lookup(STREAM_NAME_ENV) {
            self.stream_name = stream_name;
        }
        if let Some(host) = lookup("NEL_RELAY_HOST") {
            self.http.host = host;
        }
        if let Some(port) = lookup("NEL_RELAY_PORT") {
            self.http.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("NEL_RELAY_PORT '{}' is not a port", port)))?;
        }
        if let Some(level) = lookup("NEL_RELAY_LOG") {
            self.log_level = level;
        }
        if let Some(kind) = lookup("NEL_RELAY_SINK") {
            self.sink = match kind.to_ascii_lowercase().as_str() {
                "memory" => SinkConfig::Memory,
                "kinesis" => match &self.sink {
                    SinkConfig::Kinesis(settings) => SinkConfig::Kinesis(settings.clone()),
                    SinkConfig::Memory => SinkConfig::Kinesis(KinesisSettings::default()),
                },
                other => {
                    return Err(ConfigError::Invalid(format!("Unknown sink kind '{}'", other)))
                }
            };
        }

        if let SinkConfig::Kinesis(settings) = &mut self.sink {
            if let Some(region) = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION")) {
                settings.region = region;
            }
            if let Some(endpoint) = lookup("NEL_RELAY_KINESIS_ENDPOINT") {
                settings.endpoint = Some(endpoint);
            }
            if let Some(key) = lookup("AWS_ACCESS_KEY_ID") {
                settings.access_key_id = Some(key);
            }
            if let Some(secret) = lookup("AWS_SECRET_ACCESS_KEY") {
                settings.secret_access_key = Some(secret);
            }
            if let Some(token) = lookup("AWS_SESSION_TOKEN") {
                settings.session_token = Some(token);
            }
        }

        Ok(())
    }

    /// Check required values and ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.stream_name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "stream_name is required (set it in the config file or via {})",
                STREAM_NAME_ENV
            )));
        }

        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http.port must be > 0".to_string()));
        }

        if !self.http.relay_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "http.relay_path '{}' must start with '/'",
                self.http.relay_path
            )));
        }

        if ["/health", "/metrics"].contains(&self.http.relay_path.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "http.relay_path '{}' collides with a built-in route",
                self.http.relay_path
            )));
        }

        if self.http.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("http.max_body_bytes must be > 0".to_string()));
        }

        if let SinkConfig::Kinesis(settings) = &self.sink {
            if settings.region.is_empty() {
                return Err(ConfigError::Invalid("sink.region must not be empty".to_string()));
            }
            if settings.timeout_ms == 0 {
                return Err(ConfigError::Invalid("sink.timeout_ms must be > 0".to_string()));
            }
            if settings.access_key_id.is_some() != settings.secret_access_key.is_some() {
                return Err(ConfigError::Invalid(
                    "sink credentials need both access_key_id and secret_access_key".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Construct the configured sink
    pub fn build_sink(&self) -> ConfigResult<Arc<dyn StreamSink>> {
        match &self.sink {
            SinkConfig::Memory => Ok(Arc::new(MemoryStreamSink::new())),
            SinkConfig::Kinesis(settings) => {
                let sink = KinesisStreamSink::new(settings.to_sink_config())?;
                Ok(Arc::new(sink))
            }
        }
    }
}
