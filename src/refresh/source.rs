use async_trait::async_trait;
use std::time::Duration;

use super::error::RefreshError;

/// Where the raw OEM document comes from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RefreshError>;
}

pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> Result<Self, RefreshError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RefreshError::FetchFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RefreshError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RefreshError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RefreshError::FetchFailed(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshError::FetchFailed(e.to_string()))?;
        log::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}
