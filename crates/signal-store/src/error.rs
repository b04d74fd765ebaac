//! Storage error types

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage-specific error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to construct storage client: {0}")]
    Client(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Finalize failed: {0}")]
    Finalize(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    pub fn client<T: Into<String>>(msg: T) -> Self {
        Self::Client(msg.into())
    }

    pub fn authentication<T: Into<String>>(msg: T) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn write<T: Into<String>>(msg: T) -> Self {
        Self::Write(msg.into())
    }

    pub fn finalize<T: Into<String>>(msg: T) -> Self {
        Self::Finalize(msg.into())
    }

    pub fn read<T: Into<String>>(msg: T) -> Self {
        Self::Read(msg.into())
    }

    pub fn invalid_key<T: Into<String>>(key: T) -> Self {
        Self::InvalidKey(key.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        Self::write(format!("Sled error: {}", err))
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        Self::configuration(format!("Invalid URL: {}", err))
    }
}
