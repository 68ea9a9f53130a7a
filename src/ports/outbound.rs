//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DateRange, DomainError, ImageRequest, SignInResult, SourceMessage};
use std::path::Path;

/// Telegram channel history.
#[async_trait::async_trait]
pub trait MessageSourcePort: Send + Sync {
    /// List posts of `channel` published within `range`. Order is not guaranteed.
    async fn list_messages(
        &self,
        channel: &str,
        range: &DateRange,
    ) -> Result<Vec<SourceMessage>, DomainError>;
}

/// Final destination of the digest (Saved Messages).
#[async_trait::async_trait]
pub trait DeliveryPort: Send + Sync {
    /// Send a file with a markdown caption.
    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), DomainError>;

    /// Send a markdown text message.
    async fn send_text(&self, text: &str) -> Result<(), DomainError>;
}

/// One request/response call to a text-generation provider. No retries here;
/// see `usecases::TextClient`.
#[async_trait::async_trait]
pub trait TextGeneratorPort: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Text-to-image provider. Returns the raw `output` value of the prediction
/// (a URL string or a list of URLs, depending on the model).
#[async_trait::async_trait]
pub trait ImageProviderPort: Send + Sync {
    async fn generate(&self, request: &ImageRequest) -> Result<serde_json::Value, DomainError>;
}

/// Plain HTTP GET of generated image bytes.
#[async_trait::async_trait]
pub trait ImageDownloaderPort: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DomainError>;
}

/// External image format conversion (e.g. ImageMagick).
#[async_trait::async_trait]
pub trait ImageConverterPort: Send + Sync {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), DomainError>;
}

/// Telegram login. Session is persisted by the adapter.
#[async_trait::async_trait]
pub trait AuthPort: Send + Sync {
    async fn is_authorized(&self) -> Result<bool, DomainError>;

    /// Ask Telegram to send a login code to `phone`.
    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError>;

    /// Submit the login code. May ask for the 2FA password.
    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError>;

    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError>;
}
