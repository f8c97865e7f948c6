//! Mastodon streaming API payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use tally_core::{AccountBuilder, NormalizedEvent, NormalizedEventBuilder, Visibility};
use tally_error::DecodeError;
use tally_interface::EventDecoder;
use tracing::trace;

use crate::html::html_to_text;

/// Outer frame of every streamed message.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    id: String,
    account: AccountPayload,
    #[serde(default)]
    content: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    emojis: Vec<EmojiPayload>,
    #[serde(default)]
    in_reply_to_id: Option<String>,
    #[serde(default)]
    reblog: Option<serde_json::Value>,
    #[serde(default)]
    tags: Vec<TagPayload>,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    application: Option<ApplicationPayload>,
}

#[derive(Debug, Deserialize)]
struct AccountPayload {
    id: String,
    acct: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
struct EmojiPayload {
    shortcode: String,
}

#[derive(Debug, Deserialize)]
struct TagPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApplicationPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ConversationPayload {
    #[serde(default)]
    last_status: Option<StatusPayload>,
}

/// Decodes Mastodon `user` stream messages.
///
/// `update` events carry a status, `conversation` events carry the latest
/// status of a direct-message thread. Everything else is ignored, as are
/// statuses posted through `ignore_application` so the bot never answers
/// itself.
///
/// # Examples
///
/// ```
/// use tally_interface::EventDecoder;
/// use tally_stream::MastodonDecoder;
///
/// let decoder = MastodonDecoder::new(Some("tally".to_string()));
/// assert!(decoder.decode(r#"{"event":"delete","payload":"1"}"#).unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MastodonDecoder {
    ignore_application: Option<String>,
}

impl MastodonDecoder {
    /// Create a decoder that skips statuses posted by the named application.
    pub fn new(ignore_application: Option<String>) -> Self {
        Self { ignore_application }
    }

    fn status(&self, payload: StatusPayload) -> Result<Option<NormalizedEvent>, DecodeError> {
        let application = payload.application.as_ref().map(|a| a.name.as_str());
        if application.is_some() && application == self.ignore_application.as_deref() {
            trace!(status_id = %payload.id, ?application, "Skipping own status");
            return Ok(None);
        }

        let account = AccountBuilder::default()
            .id(payload.account.id)
            .acct(payload.account.acct)
            .display_name(payload.account.display_name)
            .username(payload.account.username)
            .build()
            .map_err(|e| DecodeError::new(format!("Invalid account: {}", e)))?;

        let mut builder = NormalizedEventBuilder::default();
        builder
            .id(payload.id)
            .account(account)
            .text(html_to_text(&payload.content))
            .is_reshare(payload.reblog.is_some_and(|r| !r.is_null()))
            .tags(
                payload
                    .tags
                    .into_iter()
                    .map(|t| t.name)
                    .collect::<BTreeSet<_>>(),
            )
            .emoji_shortcodes(
                payload
                    .emojis
                    .into_iter()
                    .map(|e| e.shortcode)
                    .collect::<BTreeSet<_>>(),
            )
            .visibility(payload.visibility)
            .in_reply_to_id(payload.in_reply_to_id);
        if let Some(created_at) = payload.created_at {
            builder.created_at(created_at);
        }

        builder
            .build()
            .map(Some)
            .map_err(|e| DecodeError::new(format!("Invalid status: {}", e)))
    }
}

/// The payload of `update` and `conversation` events is itself JSON encoded
/// as a string.
fn inner_json<T: for<'de> Deserialize<'de>>(
    event: &str,
    payload: Option<serde_json::Value>,
) -> Result<T, DecodeError> {
    let raw = match payload {
        Some(serde_json::Value::String(raw)) => raw,
        Some(_) => {
            return Err(DecodeError::new(format!(
                "{} payload is not a string",
                event
            )));
        }
        None => return Err(DecodeError::new(format!("{} event has no payload", event))),
    };
    serde_json::from_str(&raw)
        .map_err(|e| DecodeError::new(format!("Malformed {} payload: {}", event, e)))
}

impl EventDecoder for MastodonDecoder {
    fn decode(&self, raw: &str) -> Result<Option<NormalizedEvent>, DecodeError> {
        let envelope: Envelope = serde_json::from_str(raw)
            .map_err(|e| DecodeError::new(format!("Malformed envelope: {}", e)))?;

        match envelope.event.as_str() {
            "update" => {
                let status: StatusPayload = inner_json("update", envelope.payload)?;
                self.status(status)
            }
            "conversation" => {
                let conversation: ConversationPayload =
                    inner_json("conversation", envelope.payload)?;
                match conversation.last_status {
                    Some(status) => self.status(status),
                    None => Ok(None),
                }
            }
            other => {
                trace!(event = other, "Ignoring stream event");
                Ok(None)
            }
        }
    }
}
