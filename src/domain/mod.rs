//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod image_request;
pub mod markdown;

pub use entities::{
    DateRange, DigestDocument, GeneratedImage, ImageFormat, ImageModel, Locale,
    NO_MESSAGES_SENTINEL, PipelineOutcome, SignInResult, SourceMessage, message_log,
};
pub use errors::DomainError;
pub use image_request::{ImageRequest, REDPANDA_STYLES};
