//! Derives a text-to-image prompt from the finished digest.

use crate::domain::{DigestDocument, ImageModel};
use crate::usecases::text_client::TextClient;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ImagePromptComposer {
    text: Arc<TextClient>,
}

impl ImagePromptComposer {
    pub fn new(text: Arc<TextClient>) -> Self {
        Self { text }
    }

    /// Returns the trimmed image description, or `None` if generation failed.
    pub async fn compose(&self, digest: &DigestDocument, model: ImageModel) -> Option<String> {
        let prompt = Self::prompt(digest.markdown(), model);
        let Some(raw) = self.text.generate(&prompt).await else {
            warn!("image prompt generation failed");
            return None;
        };
        let image_prompt = raw.trim();
        if image_prompt.is_empty() {
            warn!("text provider returned an empty image prompt");
            return None;
        }
        info!(image_prompt = %image_prompt, "generated image prompt");
        Some(image_prompt.to_string())
    }

    fn prompt(digest: &str, model: ImageModel) -> String {
        let model_name = model.display_name();
        let char_target = model.prompt_char_target();
        format!(
            r#"Based on this AI news digest, WRITE a concise image prompt for {model_name}. The prompt should:
- Be in basic telegraphic English
- Describe a retrofuturistic poster
- Limit description to roughly {char_target} characters
- Description should NOT include quoted text.
- Include as many characters/objects from the digest as possible
- Incorporate elements of collage and creative papercut application
- Evoke a sense of potpourri (a mixture of diverse elements)
- Mention retrofuturism and techno-optimism
- Be really concise, comma-separate objects from digest.

Sample output, DO NOT, use as reference, borrow structure or ideas, just write your own:
```A retrofuturistic magazine poster, retro-styled, no text, no words, collage, paper-cut, humanoid robot (Unitree G1), AI-generated avatars, stylized brain with circuit patterns, musical notes from headphones, a scientist with AI ideas, people with oversized smartphones, a film reel turning into binary, investment charts, art supplies merging with tech, and a graduation cap with an AI chip.```

AI news digest:
===
{digest}
===

Focus on visual elements and their arrangement. No words, no quotes, no text. Be weird, unorthodox, funny, creative and vivid in your description. Output only the image prompt."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::usecases::rate_limiter::RateLimiter;
    use crate::usecases::text_client::tests::ScriptedGenerator;

    fn composer(generator: Arc<ScriptedGenerator>) -> ImagePromptComposer {
        let text = TextClient::new(generator, Arc::new(RateLimiter::new(30)));
        ImagePromptComposer::new(Arc::new(text))
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_is_trimmed() {
        let generator = ScriptedGenerator::new(vec![Ok("\n  A retrofuturistic poster, robots  \n".into())]);
        let digest = DigestDocument::new("**Digest**\n- robots");
        let out = composer(Arc::clone(&generator))
            .compose(&digest, ImageModel::Flux)
            .await;
        assert_eq!(out.as_deref(), Some("A retrofuturistic poster, robots"));

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("**Digest**\n- robots"));
        assert!(prompts[0].contains("for FLUX 1 PRO"));
        assert!(prompts[0].contains("roughly 512 characters"));
        assert!(prompts[0].contains("No words, no quotes, no text."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_char_target_follows_model() {
        let generator = ScriptedGenerator::new(vec![Ok("poster".into())]);
        let digest = DigestDocument::new("d");
        composer(Arc::clone(&generator))
            .compose(&digest, ImageModel::RedPanda)
            .await
            .unwrap();
        assert!(generator.prompts.lock().unwrap()[0].contains("roughly 1000 characters"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_gives_none() {
        let generator = ScriptedGenerator::new(vec![
            Err(DomainError::Ai("x".into())),
            Err(DomainError::Ai("x".into())),
        ]);
        let digest = DigestDocument::new("d");
        assert!(composer(generator).compose(&digest, ImageModel::Flux).await.is_none());
    }
}
