//! Replicate predictions adapter. Implements ImageProviderPort.
//!
//! Creates a prediction with `Prefer: wait` and polls `urls.get` while the
//! model is still starting or processing.

use crate::domain::{DomainError, ImageRequest};
use crate::ports::ImageProviderPort;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";
pub const DEFAULT_POLL_ATTEMPTS: u32 = 60;
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Replicate API adapter.
pub struct ReplicateAdapter {
    client: reqwest::Client,
    api_base: String,
    token: String,
    poll_attempts: u32,
}

impl ReplicateAdapter {
    /// # Arguments
    /// * `token` - Replicate API token (`r8_...`)
    /// * `poll_attempts` - max status polls before giving up
    pub fn new(token: String, poll_attempts: u32) -> Self {
        Self::with_base(DEFAULT_API_BASE.to_string(), token, poll_attempts)
    }

    pub fn with_base(api_base: String, token: String, poll_attempts: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            poll_attempts,
        }
    }

    /// Endpoint and body for creating a prediction.
    fn create_call(&self, request: &ImageRequest) -> (String, Value) {
        match request.version {
            Some(version) => (
                format!("{}/predictions", self.api_base),
                json!({ "version": version, "input": request.input }),
            ),
            None => (
                format!("{}/models/{}/predictions", self.api_base, request.slug),
                json!({ "input": request.input }),
            ),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Prediction, DomainError> {
        let response = req
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DomainError::ImageProvider(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Replicate API returned error");
            return Err(DomainError::ImageProvider(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::ImageProvider(format!("Failed to parse prediction: {}", e)))
    }
}

/// Prediction object as returned by create/get.
#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    id: String,
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    urls: PredictionUrls,
}

#[derive(Debug, Default, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

impl Prediction {
    /// `None` while the prediction is still running.
    fn outcome(&self) -> Option<Result<Value, DomainError>> {
        match self.status.as_str() {
            "succeeded" => Some(Ok(self.output.clone())),
            "failed" | "canceled" | "aborted" => Some(Err(DomainError::ImageProvider(format!(
                "prediction {} {}: {}",
                self.id, self.status, self.error
            )))),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl ImageProviderPort for ReplicateAdapter {
    async fn generate(&self, request: &ImageRequest) -> Result<Value, DomainError> {
        let (url, body) = self.create_call(request);
        info!(model = %request.model, slug = request.slug, url = %url, "creating Replicate prediction");

        let mut prediction = self
            .send(self.client.post(&url).header("Prefer", "wait").json(&body))
            .await?;

        for attempt in 0..=self.poll_attempts {
            if let Some(outcome) = prediction.outcome() {
                return outcome;
            }
            if attempt == self.poll_attempts {
                break;
            }
            let get_url = prediction.urls.get.clone().ok_or_else(|| {
                DomainError::ImageProvider("prediction has no status URL".to_string())
            })?;
            debug!(id = %prediction.id, status = %prediction.status, attempt, "prediction pending");
            tokio::time::sleep(POLL_INTERVAL).await;
            prediction = self.send(self.client.get(&get_url)).await?;
        }

        Err(DomainError::ImageProvider(format!(
            "prediction {} still {} after {} polls",
            prediction.id, prediction.status, self.poll_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageModel;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn adapter() -> ReplicateAdapter {
        ReplicateAdapter::with_base("https://api.test/v1/".into(), "r8_token".into(), 3)
    }

    #[test]
    fn test_official_model_endpoint() {
        let mut rng = StdRng::seed_from_u64(0);
        let req = ImageRequest::for_model(ImageModel::Flux, "robots", &mut rng);
        let (url, body) = adapter().create_call(&req);
        assert_eq!(url, "https://api.test/v1/models/black-forest-labs/flux-pro/predictions");
        assert_eq!(body["input"]["prompt"], "robots");
        assert!(body.get("version").is_none());
    }

    #[test]
    fn test_versioned_model_endpoint() {
        let mut rng = StdRng::seed_from_u64(0);
        let req = ImageRequest::for_model(ImageModel::FluxLora, "robots", &mut rng);
        let (url, body) = adapter().create_call(&req);
        assert_eq!(url, "https://api.test/v1/predictions");
        assert_eq!(body["version"], req.version.unwrap());
    }

    #[test]
    fn test_prediction_outcomes() {
        let done: Prediction = serde_json::from_str(
            r#"{"id":"p1","status":"succeeded","output":["https://replicate.delivery/a.webp"]}"#,
        )
        .unwrap();
        assert_eq!(
            done.outcome().unwrap().unwrap(),
            json!(["https://replicate.delivery/a.webp"])
        );

        let failed: Prediction =
            serde_json::from_str(r#"{"id":"p2","status":"failed","error":"NSFW content"}"#)
                .unwrap();
        assert!(matches!(
            failed.outcome(),
            Some(Err(DomainError::ImageProvider(_)))
        ));

        let running: Prediction = serde_json::from_str(
            r#"{"id":"p3","status":"processing","output":null,"urls":{"get":"https://api.test/v1/predictions/p3"}}"#,
        )
        .unwrap();
        assert!(running.outcome().is_none());
        assert_eq!(
            running.urls.get.as_deref(),
            Some("https://api.test/v1/predictions/p3")
        );
    }
}
