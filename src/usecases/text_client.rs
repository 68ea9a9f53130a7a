//! Rate-limited, retrying wrapper over a `TextGeneratorPort`.
//!
//! Failures never cross this boundary: the caller gets `None`.

use crate::ports::TextGeneratorPort;
use crate::usecases::rate_limiter::RateLimiter;
use std::sync::Arc;
use tracing::{debug, error, info};

/// One initial attempt plus one retry.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

pub struct TextClient {
    generator: Arc<dyn TextGeneratorPort>,
    limiter: Arc<RateLimiter>,
    max_attempts: u32,
}

impl TextClient {
    pub fn new(generator: Arc<dyn TextGeneratorPort>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            generator,
            limiter,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the attempt budget (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Generate text for `prompt`. Returns `None` once all attempts failed.
    ///
    /// Every attempt is followed by the limiter's throttle sleep; a failed
    /// attempt additionally waits one interval before the retry.
    pub async fn generate(&self, prompt: &str) -> Option<String> {
        for attempt in 1..=self.max_attempts {
            debug!(attempt, prompt_len = prompt.len(), "calling text provider");
            let result = self.limiter.run(self.generator.generate(prompt)).await;
            match result {
                Ok(text) => {
                    debug!(attempt, text_len = text.len(), "text provider call successful");
                    return Some(text);
                }
                Err(e) => {
                    error!(attempt, error = %e, "text provider call failed");
                    if attempt < self.max_attempts {
                        info!("retrying text provider call");
                        tokio::time::sleep(self.limiter.interval()).await;
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Replays scripted responses and counts calls. Runs dry -> error.
    pub(crate) struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, DomainError>>>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(responses: Vec<Result<String, DomainError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl TextGeneratorPort for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DomainError::Ai("script exhausted".into())))
        }
    }

    fn client(generator: Arc<ScriptedGenerator>) -> (TextClient, Arc<RateLimiter>) {
        let limiter = Arc::new(RateLimiter::new(30));
        (TextClient::new(generator, Arc::clone(&limiter)), limiter)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_try() {
        let generator = ScriptedGenerator::new(vec![Ok("digest".into())]);
        let (client, limiter) = client(Arc::clone(&generator));
        let start = Instant::now();

        assert_eq!(client.generate("p").await.as_deref(), Some("digest"));
        assert_eq!(generator.calls(), 1);
        // Throttle is applied even on success.
        assert!(start.elapsed() >= limiter.interval());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_once_then_succeeds() {
        let generator = ScriptedGenerator::new(vec![
            Err(DomainError::Ai("API error 529".into())),
            Ok("second".into()),
        ]);
        let (client, limiter) = client(Arc::clone(&generator));
        let start = Instant::now();

        assert_eq!(client.generate("p").await.as_deref(), Some("second"));
        assert_eq!(generator.calls(), 2);
        // throttle + retry wait + throttle
        assert!(start.elapsed() >= limiter.interval() * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_give_none_without_third_attempt() {
        let generator = ScriptedGenerator::new(vec![
            Err(DomainError::Ai("HTTP request failed".into())),
            Err(DomainError::Ai("API error 500".into())),
            Ok("never".into()),
        ]);
        let (client, _) = client(Arc::clone(&generator));

        assert!(client.generate("p").await.is_none());
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_budget() {
        let generator = ScriptedGenerator::new(vec![Err(DomainError::Ai("x".into()))]);
        let (client, _) = client(Arc::clone(&generator));
        let client = client.with_max_attempts(1);

        assert!(client.generate("p").await.is_none());
        assert_eq!(generator.calls(), 1);
    }
}
