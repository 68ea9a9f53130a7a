//! Application use cases. Orchestrate domain logic via ports.

pub mod auth_service;
pub mod digest_composer;
pub mod image_prompt_composer;
pub mod image_service;
pub mod pipeline;
pub mod rate_limiter;
pub mod text_client;

pub use auth_service::AuthService;
pub use digest_composer::{DigestComposer, DigestStyle};
pub use image_prompt_composer::ImagePromptComposer;
pub use image_service::ImageService;
pub use pipeline::{DigestPipeline, PipelineSettings};
pub use rate_limiter::RateLimiter;
pub use text_client::TextClient;
