//! Where tiles come from when they are not cached.

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;

use tracing::debug;

use crate::config::DownloadConfig;
use crate::key::TileKey;

/// Errors produced while fetching one tile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
    /// The request could not be sent or timed out.
    #[error("tile request failed: {0}")]
    Request(String),
    /// The server answered with a non-success status.
    #[error("tile server returned status {status}")]
    Status { status: u16 },
    /// The response body could not be read or was empty.
    #[error("tile body unusable: {0}")]
    Body(String),
    /// The fetch was abandoned because the download was cancelled.
    #[error("fetch cancelled")]
    Cancelled,
}

/// Async source of tile imagery. Enables mocking in tests.
#[async_trait::async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch the encoded image for `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the tile cannot be retrieved.
    async fn fetch(&self, key: TileKey) -> Result<Vec<u8>, FetchError>;
}

/// Tile server reached over HTTP(S) through a `{z}/{x}/{y}` URL template.
pub struct HttpTileSource {
    http: reqwest::Client,
    url_template: String,
}

impl HttpTileSource {
    /// Build a client with the configured timeouts and user agent.
    ///
    /// # Errors
    ///
    /// [`FetchError::ClientBuild`] if the TLS backend cannot be initialized.
    pub fn new(config: &DownloadConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        Ok(Self { http, url_template: config.url_template.clone() })
    }

    #[must_use]
    pub fn url_for(&self, key: TileKey) -> String {
        key.url(&self.url_template)
    }
}

#[async_trait::async_trait]
impl TileSource for HttpTileSource {
    async fn fetch(&self, key: TileKey) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(key);
        debug!(%key, %url, "fetching tile");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;
        if body.is_empty() {
            return Err(FetchError::Body("empty response".into()));
        }
        Ok(body.to_vec())
    }
}
