//! Dry-run delivery. Implements DeliveryPort by logging instead of sending.

use crate::domain::DomainError;
use crate::ports::DeliveryPort;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct LogDelivery;

#[async_trait::async_trait]
impl DeliveryPort for LogDelivery {
    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), DomainError> {
        info!(path = %path.display(), "[DRY RUN] would send image with caption:\n{}", caption);
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), DomainError> {
        info!("[DRY RUN] would send text:\n{}", text);
        Ok(())
    }
}
