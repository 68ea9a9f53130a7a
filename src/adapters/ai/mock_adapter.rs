//! Mock AI adapter for dry runs without API calls.
//!
//! Returns canned markdown shaped like a real digest (or image prompt).

use crate::domain::DomainError;
use crate::ports::TextGeneratorPort;
use std::time::Duration;
use tracing::info;

/// Marker present only in image-prompt requests.
const IMAGE_PROMPT_MARKER: &str = "WRITE a concise image prompt";

/// Mock text generator.
///
/// Simulates network latency with configurable delay.
pub struct MockAiAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextGeneratorPort for MockAiAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        info!(prompt_len = prompt.len(), "[MOCK] Simulating text generation");

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        if prompt.contains(IMAGE_PROMPT_MARKER) {
            return Ok("A retrofuturistic magazine poster, no text, collage, paper-cut, \
                       [MOCK] robot reading a newspaper, glowing circuit brain"
                .to_string());
        }

        let links = prompt.matches("Message link:").count();
        Ok(format!(
            "**[MOCK] Digest**\n\nSimulated digest of {} messages. \
             In production, the LLM would group the news into sections.\n\n\
             **🤖 LLM**\n- [MOCK] First item\n\n- [MOCK] Second item\n\n\n\n#mock",
            links
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DigestDocument;

    #[tokio::test]
    async fn test_mock_digest_counts_messages() {
        let adapter = MockAiAdapter::with_delay(1);
        let prompt = "Messages:\nMessage link: a\n\nMessage link: b";
        let out = adapter.generate(prompt).await.unwrap();
        assert!(out.contains("Simulated digest of 2 messages"));
        let digest = DigestDocument::new(&out);
        assert!(digest.markdown().contains("- [MOCK] First item\n- [MOCK] Second item"));
    }

    #[tokio::test]
    async fn test_mock_image_prompt() {
        let adapter = MockAiAdapter::with_delay(1);
        let out = adapter
            .generate("Based on this AI news digest, WRITE a concise image prompt for FLUX")
            .await
            .unwrap();
        assert!(out.starts_with("A retrofuturistic magazine poster"));
    }
}
