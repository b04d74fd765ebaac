//! Signaller error types

use std::time::Duration;

/// Result type for signaller operations
pub type Result<T> = std::result::Result<T, SignallerError>;

/// Failure to learn who currently holds leadership. Fatal to the loop.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("Election service request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Election service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Election service returned status {status}")]
    Status { status: u16 },

    #[error("Failed to read election service response: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Malformed election service payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ResolutionError {
    pub(crate) fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Request(err)
        }
    }
}

/// Failure to store the leadership flag. Logged and absorbed by the loop.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to open writer for {key}: {source}")]
    Open {
        key: String,
        #[source]
        source: signal_store::StoreError,
    },

    #[error("Failed to write status for {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: signal_store::StoreError,
    },

    #[error("Failed to finalize status for {key}: {source}")]
    Finalize {
        key: String,
        #[source]
        source: signal_store::StoreError,
    },

    #[error("Publishing status for {key} exceeded {deadline:?}")]
    Timeout { key: String, deadline: Duration },
}

/// Invalid or missing startup parameter. Fatal before the loop starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Election service URL is required (ELECTOR_GET_URL)")]
    MissingElectorUrl,

    #[error("Invalid election service URL {url}: {reason}")]
    InvalidElectorUrl { url: String, reason: String },

    #[error("Bucket name is required for the {0} storage backend (BUCKET_NAME)")]
    MissingBucketName(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to read config file: {0}")]
    Read(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to initialize storage: {0}")]
    Storage(#[from] signal_store::StoreError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigurationError {
    pub fn invalid_value<T: Into<String>>(field: &'static str, reason: T) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Top-level signaller error
#[derive(Debug, thiserror::Error)]
pub enum SignallerError {
    #[error("Leader resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Status publish failed: {0}")]
    Publish(#[from] PublishError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Host identity unavailable: {0}")]
    HostIdentity(String),
}

impl SignallerError {
    pub fn host_identity<T: Into<String>>(msg: T) -> Self {
        Self::HostIdentity(msg.into())
    }
}
