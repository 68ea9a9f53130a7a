//! Map Grammers types to domain entities.
//!
//! Extracts SourceMessage from raw tl message enums.

use crate::domain::SourceMessage;
use chrono::{DateTime, Utc};
use grammers_client::tl;

/// Permanent link of a channel post. Public channels use the username,
/// private ones the `t.me/c/<id>` form.
pub fn message_link(username: Option<&str>, channel_id: i64, message_id: i32) -> String {
    match username {
        Some(name) if !name.is_empty() => format!("https://t.me/{}/{}", name, message_id),
        _ => format!("https://t.me/c/{}/{}", channel_id, message_id),
    }
}

/// Strip the Bot API `-100` prefix from a channel dialog id.
pub fn bare_channel_id(dialog_id: i64) -> i64 {
    const CHANNEL_OFFSET: i64 = 1_000_000_000_000;
    if dialog_id < -CHANNEL_OFFSET {
        -dialog_id - CHANNEL_OFFSET
    } else {
        dialog_id.abs()
    }
}

/// Map a raw tl message to a domain SourceMessage.
///
/// Service messages and empty slots are skipped. Posts without text are kept
/// here; the pipeline drops them.
pub fn message_to_domain(
    msg: &tl::enums::Message,
    username: Option<&str>,
    channel_id: i64,
) -> Option<SourceMessage> {
    match msg {
        tl::enums::Message::Message(m) => Some(SourceMessage {
            id: m.id,
            date: timestamp(m.date)?,
            text: m.message.clone(),
            link: message_link(username, channel_id, m.id),
        }),
        tl::enums::Message::Empty(_) | tl::enums::Message::Service(_) => None,
    }
}

/// Id of any raw history slot, used as the next page's `offset_id`.
pub fn raw_message_id(msg: &tl::enums::Message) -> i32 {
    match msg {
        tl::enums::Message::Message(m) => m.id,
        tl::enums::Message::Service(m) => m.id,
        tl::enums::Message::Empty(m) => m.id,
    }
}

fn timestamp(unix: i32) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(i64::from(unix), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_link() {
        assert_eq!(
            message_link(Some("aizvestia"), 1, 42),
            "https://t.me/aizvestia/42"
        );
    }

    #[test]
    fn test_private_link() {
        assert_eq!(message_link(None, 1234567, 7), "https://t.me/c/1234567/7");
        assert_eq!(message_link(Some(""), 1234567, 7), "https://t.me/c/1234567/7");
    }

    #[test]
    fn test_bare_channel_id() {
        assert_eq!(bare_channel_id(-1001234567890), 1234567890);
        assert_eq!(bare_channel_id(-4242), 4242);
    }

    #[test]
    fn test_timestamp() {
        let ts = timestamp(1_709_546_400).unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2024-03-04 10:00");
    }
}
