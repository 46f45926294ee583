use crate::utils::error::{HallError, Result};
use reqwest::{Client, Response};
use std::time::Duration;

/// Reads a source that is either an http(s) URL or a local file path.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

impl SourceFetcher {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch_bytes(&self, source: &str) -> Result<Vec<u8>> {
        if !is_remote(source) {
            return read_local(source).await;
        }
        let response = self.get_checked(source).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Remote bodies are decoded with the charset from `Content-Type`
    /// (UTF-8 when absent); local files are read as UTF-8, replacing
    /// invalid sequences.
    pub async fn fetch_text(&self, source: &str) -> Result<String> {
        if !is_remote(source) {
            let bytes = read_local(source).await?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        let response = self.get_checked(source).await?;
        Ok(response.text().await?)
    }

    async fn get_checked(&self, source: &str) -> Result<Response> {
        tracing::debug!("Making request to: {}", source);
        let response = self.client.get(source).send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(HallError::SourceError {
                source_name: source.to_string(),
                message: format!("HTTP status {}", status),
            });
        }
        Ok(response)
    }
}

async fn read_local(source: &str) -> Result<Vec<u8>> {
    tracing::debug!("Reading local source: {}", source);
    tokio::fs::read(source)
        .await
        .map_err(|e| HallError::SourceError {
            source_name: source.to_string(),
            message: e.to_string(),
        })
}
