//! Digest pipeline: messages -> digest -> image prompt -> image -> delivery.
//!
//! Strictly sequential; each step feeds the next. Every successful run ends
//! in exactly one delivery.

use crate::domain::{
    DateRange, DigestDocument, DomainError, GeneratedImage, ImageModel, PipelineOutcome,
    SourceMessage,
};
use crate::ports::{DeliveryPort, MessageSourcePort};
use crate::usecases::digest_composer::DigestComposer;
use crate::usecases::image_prompt_composer::ImagePromptComposer;
use crate::usecases::image_service::ImageService;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Per-run settings resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Source channel username (without `@`).
    pub channel: String,
    pub image_model: ImageModel,
}

pub struct DigestPipeline {
    source: Arc<dyn MessageSourcePort>,
    digest: DigestComposer,
    image_prompt: ImagePromptComposer,
    images: ImageService,
    delivery: Arc<dyn DeliveryPort>,
    settings: PipelineSettings,
}

impl DigestPipeline {
    pub fn new(
        source: Arc<dyn MessageSourcePort>,
        digest: DigestComposer,
        image_prompt: ImagePromptComposer,
        images: ImageService,
        delivery: Arc<dyn DeliveryPort>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            digest,
            image_prompt,
            images,
            delivery,
            settings,
        }
    }

    /// Run once for `range`.
    ///
    /// `Err` only when the final text-only delivery itself failed (or the
    /// message source is unreachable).
    pub async fn run(&self, range: &DateRange) -> Result<PipelineOutcome, DomainError> {
        info!(channel = %self.settings.channel, range = %range, "fetching messages");
        let fetched = self
            .source
            .list_messages(&self.settings.channel, range)
            .await?;
        let messages = prepare_messages(fetched, range);
        info!(count = messages.len(), "total messages fetched");

        if messages.is_empty() {
            error!("no messages were fetched from the channel for the requested period");
            return Ok(PipelineOutcome::NoMessages);
        }

        let digest = match self.digest.compose(&messages, range).await {
            Some(d) if !d.is_sentinel() => d,
            _ => {
                error!("failed to create digest");
                return Ok(PipelineOutcome::DigestFailed);
            }
        };

        let image = self.illustrate(&digest).await;
        self.deliver(&digest, image.as_ref()).await
    }

    async fn illustrate(&self, digest: &DigestDocument) -> Option<GeneratedImage> {
        let model = self.settings.image_model;
        let prompt = self.image_prompt.compose(digest, model).await?;
        let image = self.images.generate(&prompt, model).await;
        match &image {
            Some(img) => info!(path = %img.path.display(), "generated image saved"),
            None => error!("failed to generate or save image"),
        }
        image
    }

    async fn deliver(
        &self,
        digest: &DigestDocument,
        image: Option<&GeneratedImage>,
    ) -> Result<PipelineOutcome, DomainError> {
        if let Some(img) = image {
            match self.delivery.send_file(&img.path, digest.markdown()).await {
                Ok(()) => {
                    info!("digest image with text caption sent");
                    return Ok(PipelineOutcome::Delivered { with_image: true });
                }
                Err(e) => {
                    error!(error = %e, "error sending image with caption");
                }
            }
        }

        warn!("sending digest as text only");
        self.delivery.send_text(digest.markdown()).await?;
        info!("digest sent as text only");
        Ok(PipelineOutcome::Delivered { with_image: false })
    }
}

/// Keep in-range posts with a body, oldest first.
fn prepare_messages(mut messages: Vec<SourceMessage>, range: &DateRange) -> Vec<SourceMessage> {
    messages.retain(|m| m.has_body() && range.contains(m.date));
    messages.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    messages
}
