//! Leadership resolution against the election service

use crate::error::{ConfigurationError, ResolutionError};
use crate::types::LeaderIdentity;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Answers "who is the leader right now"
#[async_trait]
pub trait LeaderResolver: Send + Sync {
    async fn resolve_leader(&self) -> Result<LeaderIdentity, ResolutionError>;
}

/// Election service answer; fields other than `name` are ignored.
#[derive(Debug, Deserialize)]
struct ElectionResponse {
    name: String,
}

/// Parse an election service body into the leader identity
pub fn parse_leader(body: &[u8]) -> Result<LeaderIdentity, ResolutionError> {
    let response: ElectionResponse = serde_json::from_slice(body)?;
    Ok(LeaderIdentity::new(response.name))
}

/// Queries the election service over HTTP
pub struct HttpLeaderResolver {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpLeaderResolver {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ConfigurationError> {
        let endpoint = parse_endpoint(endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

#[async_trait]
impl LeaderResolver for HttpLeaderResolver {
    async fn resolve_leader(&self) -> Result<LeaderIdentity, ResolutionError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| ResolutionError::from_request(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ResolutionError::Timeout(self.timeout)
            } else {
                ResolutionError::Body(e)
            }
        })?;

        let leader = parse_leader(&body)?;
        tracing::debug!("Election service reports leader {:?}", leader.as_str());
        Ok(leader)
    }
}

/// Always reports the same leader, for running without an election service
#[derive(Debug, Clone)]
pub struct FixedLeaderResolver {
    leader: LeaderIdentity,
}

impl FixedLeaderResolver {
    pub fn new<T: Into<String>>(leader: T) -> Self {
        Self {
            leader: LeaderIdentity::new(leader),
        }
    }
}

#[async_trait]
impl LeaderResolver for FixedLeaderResolver {
    async fn resolve_leader(&self) -> Result<LeaderIdentity, ResolutionError> {
        Ok(self.leader.clone())
    }
}

/// Validate an election service URL
pub fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigurationError> {
    if endpoint.trim().is_empty() {
        return Err(ConfigurationError::MissingElectorUrl);
    }

    let url = Url::parse(endpoint).map_err(|e| ConfigurationError::InvalidElectorUrl {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigurationError::InvalidElectorUrl {
            url: endpoint.to_string(),
            reason: format!("unsupported scheme {}", scheme),
        }),
    }
}
