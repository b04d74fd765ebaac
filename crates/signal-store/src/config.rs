//! Storage backend configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Google Cloud Storage API endpoint
pub const DEFAULT_GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// Default instance metadata token endpoint
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Storage backend configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageBackendConfig {
    /// Google Cloud Storage bucket accessed through the JSON API
    Gcs {
        #[serde(default = "default_gcs_endpoint")]
        endpoint: String,

        /// Static bearer token. When absent a token is requested from the
        /// instance metadata server before every write.
        #[serde(default)]
        token: Option<String>,

        #[serde(default = "default_metadata_token_url")]
        metadata_token_url: String,
    },

    /// Local embedded storage using Sled, one tree per bucket
    Sled {
        path: PathBuf,
    },

    /// In-memory storage (for development and testing)
    Memory,
}

impl Default for StorageBackendConfig {
    fn default() -> Self {
        Self::Gcs {
            endpoint: default_gcs_endpoint(),
            token: None,
            metadata_token_url: default_metadata_token_url(),
        }
    }
}

impl StorageBackendConfig {
    /// Short name of the backend, used in logs
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Gcs { .. } => "gcs",
            Self::Sled { .. } => "sled",
            Self::Memory => "memory",
        }
    }

    /// Whether the backend needs a named remote bucket
    pub fn requires_bucket(&self) -> bool {
        matches!(self, Self::Gcs { .. })
    }
}

fn default_gcs_endpoint() -> String {
    DEFAULT_GCS_ENDPOINT.to_string()
}

fn default_metadata_token_url() -> String {
    DEFAULT_METADATA_TOKEN_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_is_gcs() {
        let config = StorageBackendConfig::default();
        assert_eq!(config.backend_name(), "gcs");
        assert!(config.requires_bucket());
    }

    #[test]
    fn test_gcs_defaults_filled_from_toml() {
        let config: StorageBackendConfig = toml::from_str(r#"type = "gcs""#).unwrap();
        assert_eq!(config, StorageBackendConfig::default());
    }

    #[test]
    fn test_sled_from_toml() {
        let config: StorageBackendConfig =
            toml::from_str("type = \"sled\"\npath = \"/var/lib/leader-signal\"").unwrap();
        assert_eq!(
            config,
            StorageBackendConfig::Sled {
                path: PathBuf::from("/var/lib/leader-signal"),
            }
        );
        assert!(!config.requires_bucket());
    }
}
