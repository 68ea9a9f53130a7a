//! Digest composer. Builds the summarization prompt and normalizes the result.

use crate::domain::{DateRange, DigestDocument, Locale, SourceMessage, message_log};
use crate::usecases::text_client::TextClient;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Presentation settings of the digest post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestStyle {
    /// Title prefix; the date label is appended.
    pub title: String,
    /// Closing tag appended verbatim at the very end.
    pub footer: String,
    /// Output language, as it should appear in the instructions.
    pub language: String,
    pub locale: Locale,
}

impl Default for DigestStyle {
    fn default() -> Self {
        Self {
            title: "Дайджест ИИзвестий за неделю".to_string(),
            footer: "#ИИзвестия\n\n@aizvestia".to_string(),
            language: "Russian".to_string(),
            locale: Locale::Ru,
        }
    }
}

pub struct DigestComposer {
    text: Arc<TextClient>,
    style: DigestStyle,
}

impl DigestComposer {
    pub fn new(text: Arc<TextClient>, style: DigestStyle) -> Self {
        Self { text, style }
    }

    /// Compose the digest for `messages` (chronological, non-empty bodies).
    ///
    /// Returns the sentinel document without calling the provider when there
    /// is nothing to summarize, and `None` when generation failed.
    pub async fn compose(
        &self,
        messages: &[SourceMessage],
        range: &DateRange,
    ) -> Option<DigestDocument> {
        if messages.is_empty() {
            error!("no messages to create digest from");
            return Some(DigestDocument::sentinel());
        }

        let label = range.label(self.style.locale);
        debug!(label = %label, "formatted date range");

        let log = message_log(messages);
        info!(messages = messages.len(), log_len = log.len(), "creating digest");
        let prompt = self.prompt(&label, &log);

        let raw = self.text.generate(&prompt).await?;
        if raw.trim().is_empty() {
            error!("text provider returned an empty digest");
            return None;
        }
        let digest = DigestDocument::new(&raw);
        debug!(
            digest_start = %digest.markdown().chars().take(500).collect::<String>(),
            "processed digest"
        );
        Some(digest)
    }

    fn prompt(&self, label: &str, log: &str) -> String {
        let DigestStyle {
            title,
            footer,
            language,
            ..
        } = &self.style;
        format!(
            r#"Create a digest for Telegram messages from {label}. Summarize key points, include original post links, apply links to the key word in the original post. DO NOT use "learn more" or "подробнее". Use {language} language.
Format:
- Title: "{title} {label}"
- Jump to content, no intro, no outro, no "Here's the digest in the requested format:" kind of text.
- Brief intro (2-3 sentences)
- Sections with emojis (e.g., LLM, Generative models, Course collections, Miscellaneous)
- Use dash (-) for news items, NO extra line breaks between items:
```
EMOJI Title
- News1
- News2
- News3
```
- Include key aspects and brief comments (2-3 sentences max)
- Link keywords to original posts
- End with: "{footer}"

Use Telegram Markdown:
**bold**, _italic_, __underline__, ~strikethrough~, ||spoiler||, [inline URL](http://www.example.com/), `code`, ```block code```

Messages to summarize:
"{log}"

Output pure markdown, be concise, MUST start with content, no intro. Avoid extra line breaks between list items. Use bold for section titles instead of #."#
        )
    }
}
