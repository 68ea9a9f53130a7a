//! Implements MessageSourcePort and DeliveryPort using grammers Client.
//!
//! History is read with raw GetHistory (newest first, paginated by offset_id)
//! and FloodWait is handled by sleeping and retrying. Delivery goes to
//! Saved Messages.

use crate::adapters::telegram::mapper;
use crate::domain::{DateRange, DomainError, SourceMessage};
use crate::ports::{DeliveryPort, MessageSourcePort};
use async_trait::async_trait;
use grammers_client::peer::Peer;
use grammers_client::tl;
use grammers_client::message::InputMessage;
use grammers_client::{Client, InvocationError};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Messages per GetHistory request.
const PAGE_SIZE: i32 = 100;
const FLOOD_WAIT_RETRIES: u32 = 3;

/// Telegram gateway adapter. Wraps grammers Client (cloned from the auth adapter's).
pub struct GrammersChannelGateway {
    client: Client,
}

impl GrammersChannelGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Resolve `@channel` to (input peer, channel id, username).
    async fn resolve_channel(
        &self,
        channel: &str,
    ) -> Result<(tl::enums::InputPeer, i64, Option<String>), DomainError> {
        let name = channel.trim_start_matches('@');
        let peer = self
            .client
            .resolve_username(name)
            .await
            .map_err(|e| DomainError::Telegram(e.to_string()))?
            .ok_or_else(|| DomainError::Telegram(format!("channel @{} not found", name)))?;

        let id = mapper::bare_channel_id(peer.id().bot_api_dialog_id_unchecked());
        let username = peer.username().map(String::from);
        info!(
            channel = name,
            title = peer.name().unwrap_or_default(),
            "retrieved channel entity"
        );
        let peer_ref = peer
            .to_ref()
            .await
            .map_err(|e| DomainError::Telegram(e.to_string()))?
            .ok_or_else(|| DomainError::Telegram("peer not in session cache".into()))?;
        Ok((peer_ref.into(), id, username))
    }

    async fn get_history_page(
        &self,
        input_peer: &tl::enums::InputPeer,
        offset_id: i32,
        offset_date: i32,
    ) -> Result<Vec<tl::enums::Message>, DomainError> {
        use tl::enums::messages::Messages;

        for attempt in 0..FLOOD_WAIT_RETRIES {
            let req = tl::functions::messages::GetHistory {
                peer: input_peer.clone(),
                offset_id,
                offset_date,
                add_offset: 0,
                limit: PAGE_SIZE,
                max_id: 0,
                min_id: 0,
                hash: 0,
            };

            match self.client.invoke(&req).await {
                Ok(raw) => {
                    return Ok(match raw {
                        Messages::Messages(m) => m.messages,
                        Messages::Slice(m) => m.messages,
                        Messages::ChannelMessages(m) => m.messages,
                        Messages::NotModified(_) => Vec::new(),
                    });
                }
                Err(InvocationError::Rpc(rpc)) if rpc.code == 420 => {
                    let wait_secs = rpc.value.unwrap_or(60) as u64;
                    warn!(attempt, wait_secs, "FloodWait, sleeping");
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                }
                Err(e) => return Err(DomainError::Telegram(e.to_string())),
            }
        }
        Err(DomainError::Telegram("FloodWait max retries".into()))
    }

    async fn saved_messages(&self) -> Result<grammers_client::session::types::PeerRef, DomainError> {
        let me = self
            .client
            .get_me()
            .await
            .map_err(|e| DomainError::Delivery(format!("get_me: {}", e)))?;
        Peer::User(me)
            .to_ref()
            .await
            .map_err(|e| DomainError::Delivery(e.to_string()))?
            .ok_or_else(|| DomainError::Delivery("self peer not in session cache".into()))
    }
}

#[async_trait]
impl MessageSourcePort for GrammersChannelGateway {
    async fn list_messages(
        &self,
        channel: &str,
        range: &DateRange,
    ) -> Result<Vec<SourceMessage>, DomainError> {
        let (input_peer, channel_id, username) = self.resolve_channel(channel).await?;
        let start_ts = range.start().timestamp();

        // offset_date returns messages sent before it; start right after the range end.
        let mut offset_date = i32::try_from(range.end().timestamp() + 1).unwrap_or(i32::MAX);
        let mut offset_id = 0;
        let mut out = Vec::new();

        'pages: loop {
            let page = self
                .get_history_page(&input_peer, offset_id, offset_date)
                .await?;
            if page.is_empty() {
                break;
            }

            for raw in &page {
                offset_id = mapper::raw_message_id(raw);
                let Some(msg) = mapper::message_to_domain(raw, username.as_deref(), channel_id)
                else {
                    continue;
                };
                if msg.date.timestamp() < start_ts {
                    break 'pages;
                }
                if range.contains(msg.date) {
                    debug!(id = msg.id, date = %msg.date, has_text = msg.has_body(), "fetched message");
                    out.push(msg);
                }
            }

            if page.len() < PAGE_SIZE as usize {
                break;
            }
            // Subsequent pages continue from the oldest id seen.
            offset_date = 0;
        }

        Ok(out)
    }
}

#[async_trait]
impl DeliveryPort for GrammersChannelGateway {
    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), DomainError> {
        let peer = self.saved_messages().await?;
        let uploaded = self
            .client
            .upload_file(path)
            .await
            .map_err(|e| DomainError::Delivery(format!("upload {}: {}", path.display(), e)))?;

        let message = InputMessage::new().markdown(caption);
        let message = if is_photo(path) {
            message.photo(uploaded)
        } else {
            message.document(uploaded)
        };

        self.client
            .send_message(peer, message)
            .await
            .map_err(|e| DomainError::Delivery(format!("send file: {}", e)))?;
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), DomainError> {
        let peer = self.saved_messages().await?;
        self.client
            .send_message(peer, InputMessage::new().markdown(text))
            .await
            .map_err(|e| DomainError::Delivery(format!("send text: {}", e)))?;
        Ok(())
    }
}

/// Telegram compresses png/jpeg as photos; other formats go as documents.
fn is_photo(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("png" | "jpg" | "jpeg")
    )
}
