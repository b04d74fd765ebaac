//! Google Cloud Storage backend
//!
//! Objects are uploaded with a single media upload when the writer is closed.
//! GCS only makes an object visible once the upload completes, which gives the
//! all-or-nothing overwrite readers rely on.

use crate::error::{Result, StoreError};
use crate::{validate_key, ObjectStore, ObjectWriter};
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Where bearer tokens for the storage API come from
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Fixed token supplied through configuration
    Static(String),

    /// Instance metadata server of the machine we run on
    Metadata { url: String },
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl TokenSource {
    async fn access_token(&self, client: &reqwest::Client) -> Result<String> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Metadata { url } => {
                let response = client
                    .get(url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|e| StoreError::authentication(format!("metadata server: {}", e)))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(StoreError::authentication(format!(
                        "metadata server returned {}",
                        status
                    )));
                }

                let token: MetadataToken = response
                    .json()
                    .await
                    .map_err(|e| StoreError::authentication(format!("invalid token payload: {}", e)))?;
                Ok(token.access_token)
            }
        }
    }
}

pub struct GcsStore {
    client: reqwest::Client,
    endpoint: Url,
    bucket: String,
    token_source: TokenSource,
}

impl GcsStore {
    /// `request_timeout` bounds every request made to the API and to the
    /// metadata server.
    pub fn new(
        endpoint: &str,
        bucket: &str,
        token_source: TokenSource,
        request_timeout: Duration,
    ) -> Result<Self> {
        if bucket.is_empty() {
            return Err(StoreError::configuration("bucket name cannot be empty"));
        }

        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(StoreError::configuration(format!(
                "storage endpoint {} cannot be used as a base URL",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| StoreError::client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            bucket: bucket.to_string(),
            token_source,
        })
    }

    fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn upload_url(&self, key: &str) -> Url {
        let mut url = self.api_url(&["upload", "storage", "v1", "b", self.bucket.as_str(), "o"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        url
    }

    fn download_url(&self, key: &str) -> Url {
        let mut url = self.api_url(&["storage", "v1", "b", self.bucket.as_str(), "o", key]);
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn open_writer(&self, key: &str) -> Result<Box<dyn ObjectWriter>> {
        validate_key(key)?;
        let token = self.token_source.access_token(&self.client).await?;

        Ok(Box::new(GcsWriter {
            client: self.client.clone(),
            url: self.upload_url(key),
            key: key.to_string(),
            token,
            buffer: Vec::new(),
        }))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let token = self.token_source.access_token(&self.client).await?;

        let response = self
            .client
            .get(self.download_url(key))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::read(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| StoreError::read(e.to_string()))?;
                Ok(Some(body.to_vec()))
            }
            status => Err(StoreError::read(format!(
                "unexpected status {} reading {}",
                status, key
            ))),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

struct GcsWriter {
    client: reqwest::Client,
    url: Url,
    key: String,
    token: String,
    buffer: Vec<u8>,
}

#[async_trait]
impl ObjectWriter for GcsWriter {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let GcsWriter {
            client,
            url,
            key,
            token,
            buffer,
        } = *self;

        let response = client
            .post(url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(buffer)
            .send()
            .await
            .map_err(|e| StoreError::write(format!("uploading {}: {}", key, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::finalize(format!(
                "upload of {} returned {}: {}",
                key,
                status,
                body.trim()
            )));
        }

        tracing::debug!("Uploaded object {}", key);
        Ok(())
    }
}
