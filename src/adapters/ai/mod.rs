//! AI adapter module. Implements TextGeneratorPort for LLM integration.
//!
//! Provides the Anthropic adapter and a mock adapter for dry runs.

pub mod anthropic_adapter;
pub mod mock_adapter;

pub use anthropic_adapter::AnthropicAdapter;
pub use mock_adapter::MockAiAdapter;
