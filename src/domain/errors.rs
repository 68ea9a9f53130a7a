//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Telegram gateway error: {0}")]
    Telegram(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Text generation failed: {0}")]
    Ai(String),

    #[error("Image provider error: {0}")]
    ImageProvider(String),

    #[error("Image download failed: {0}")]
    Download(String),

    /// Conversion tool exited non-zero or could not be spawned.
    #[error("Image conversion failed: {0}")]
    Conversion(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("I/O error: {0}")]
    Io(String),
}
