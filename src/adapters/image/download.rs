//! Plain HTTP download of generated images. Implements ImageDownloaderPort.

use crate::domain::DomainError;
use crate::ports::ImageDownloaderPort;
use tracing::debug;

pub struct HttpImageDownloader {
    client: reqwest::Client,
}

impl HttpImageDownloader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ImageDownloaderPort for HttpImageDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DomainError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::Download(format!("Error downloading image: {}", e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::Download(format!("read body: {}", e)))?;
        debug!(url, bytes = bytes.len(), "image downloaded");
        Ok(bytes.to_vec())
    }
}
