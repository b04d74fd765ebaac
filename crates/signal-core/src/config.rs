//! Signaller configuration management

use crate::error::ConfigurationError;
use crate::resolver::parse_endpoint;
use serde::{Deserialize, Serialize};
use signal_store::StorageBackendConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Main signaller configuration, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignallerConfig {
    /// Election service query endpoint
    pub elector_url: String,

    /// Bucket the status records are written into
    pub bucket_name: String,

    /// Address the liveness endpoint binds to
    pub bind_address: SocketAddr,

    /// Pause between the end of one cycle and the start of the next
    pub poll_interval: Duration,

    /// Deadline for a single election service query
    pub resolve_timeout: Duration,

    /// Deadline for a single status publish
    pub publish_timeout: Duration,

    /// Leader name to report instead of querying the election service
    pub fake_response: Option<String>,

    /// Identity to publish under instead of the system hostname
    pub host_identity: Option<String>,

    /// Storage backend configuration
    pub storage: StorageBackendConfig,
}

impl Default for SignallerConfig {
    fn default() -> Self {
        Self {
            elector_url: String::new(),
            bucket_name: String::new(),
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            poll_interval: Duration::from_secs(5),
            resolve_timeout: Duration::from_secs(5),
            publish_timeout: Duration::from_secs(5),
            fake_response: None,
            host_identity: None,
            storage: StorageBackendConfig::default(),
        }
    }
}

impl SignallerConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigurationError::Read(format!("{}: {}", path.as_ref().display(), e))
        })?;

        toml::from_str(&content).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigurationError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigurationError::Parse(e.to_string()))?;

        std::fs::write(path.as_ref(), content).map_err(|e| {
            ConfigurationError::Read(format!("{}: {}", path.as_ref().display(), e))
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        parse_endpoint(&self.elector_url)?;

        if self.storage.requires_bucket() && self.bucket_name.is_empty() {
            return Err(ConfigurationError::MissingBucketName(
                self.storage.backend_name(),
            ));
        }

        if self.poll_interval < Duration::from_millis(100) {
            return Err(ConfigurationError::invalid_value(
                "poll_interval",
                "must be at least 100ms",
            ));
        }

        if self.resolve_timeout.is_zero() {
            return Err(ConfigurationError::invalid_value(
                "resolve_timeout",
                "must be greater than zero",
            ));
        }

        if self.publish_timeout.is_zero() {
            return Err(ConfigurationError::invalid_value(
                "publish_timeout",
                "must be greater than zero",
            ));
        }

        if matches!(self.host_identity.as_deref(), Some("")) {
            return Err(ConfigurationError::invalid_value(
                "host_identity",
                "cannot be empty",
            ));
        }

        Ok(())
    }
}
