//! Anthropic Messages API adapter.
//!
//! Implements `TextGeneratorPort` with a single request/response call.
//! Retries and throttling live in `usecases::TextClient`.

use crate::domain::DomainError;
use crate::ports::TextGeneratorPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
const API_VERSION: &str = "2023-06-01";

/// Response token ceiling for every call.
pub const MAX_TOKENS: u32 = 4092;

/// Anthropic (Claude) text adapter.
pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicAdapter {
    /// Create a new adapter.
    ///
    /// # Arguments
    /// * `api_url` - Messages endpoint (e.g., "https://api.anthropic.com/v1/messages")
    /// * `api_key` - Anthropic API key
    /// * `model` - Model name (e.g., "claude-3-5-sonnet-20240620")
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    fn request(&self, prompt: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

/// Messages API request structure.
#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Messages API response structure.
#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// First text segment of the response.
    fn first_text(self) -> Option<String> {
        self.content.into_iter().find_map(|block| block.text)
    }
}

#[async_trait::async_trait]
impl TextGeneratorPort for AnthropicAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        debug!(
            prompt_len = prompt.len(),
            model = %self.model,
            "calling Claude API"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| DomainError::Ai(format!("HTTP request failed: {}", e)))?;

        // Anything but 200 counts as a failed call.
        if response.status() != reqwest::StatusCode::OK {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Claude API returned error");
            return Err(DomainError::Ai(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Ai(format!("Failed to parse API response: {}", e)))?;

        body.first_text()
            .ok_or_else(|| DomainError::Ai("No text content returned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let adapter = AnthropicAdapter::new(
            DEFAULT_API_URL.to_string(),
            "key".to_string(),
            DEFAULT_MODEL.to_string(),
        );
        let json = serde_json::to_value(adapter.request("hello")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": DEFAULT_MODEL,
                "max_tokens": 4092,
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn test_response_first_text() {
        let raw = r#"{"id":"msg_1","type":"message","role":"assistant",
            "content":[{"type":"text","text":"**Digest**"},{"type":"text","text":"second"}],
            "stop_reason":"end_turn"}"#;
        let resp: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("**Digest**"));
    }

    #[test]
    fn test_response_without_text() {
        let resp: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(resp.first_text().is_none());
        assert!(serde_json::from_str::<MessagesResponse>(r#"{"error":{}}"#).is_err());
    }
}
