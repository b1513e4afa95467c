//! Conversation files: the attachment store and message source of the preview.
//!
//! A conversation is a JSON document:
//!
//! ```json
//! {
//!   "title": "Design review",
//!   "messages": [
//!     {
//!       "direction": "incoming",
//!       "timestamp": "2024-05-01T09:30:00Z",
//!       "body": "Latest mockups",
//!       "attachment": { "content_type": "application/pdf", "filename": "mockups.pdf", "size": 482133 },
//!       "expiration": { "expires_in_seconds": 45, "duration_seconds": 60 }
//!     }
//!   ]
//! }
//! ```
//!
//! Expirations take either an absolute `expires_at` (RFC 3339) or an
//! `expires_in_seconds` offset from load time.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ChatCellError, Result};
use crate::model::attachment::AttachmentDescriptor;
use crate::model::message::{ConversationMessage, Direction, ExpirationSpec, MessageId};

/// A loaded conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub title: String,
    pub messages: Vec<ConversationMessage>,
}

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default)]
    title: Option<String>,
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<MessageId>,
    direction: Direction,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    attachment: Option<AttachmentDescriptor>,
    #[serde(default)]
    expiration: Option<RawExpiration>,
}

#[derive(Debug, Deserialize)]
struct RawExpiration {
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    expires_in_seconds: Option<f64>,
    duration_seconds: i64,
}

/// Load a conversation file. Relative expirations are resolved against `now`.
pub fn load_conversation(path: &Path, now: f64) -> Result<Conversation> {
    if !path.exists() {
        return Err(ChatCellError::FileNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ChatCellError::io(path, e))?;
    let conversation = parse_conversation(&contents, path, now)?;
    debug!(
        path = %path.display(),
        messages = conversation.messages.len(),
        "Loaded conversation"
    );
    Ok(conversation)
}

/// Parse a conversation document. `path` is only used in error messages.
pub fn parse_conversation(json: &str, path: &Path, now: f64) -> Result<Conversation> {
    let invalid = |reason: String| ChatCellError::InvalidConversation {
        path: path.to_path_buf(),
        reason,
    };

    let raw: RawConversation = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
    let loaded_at = datetime_from_seconds(now)?;

    let mut messages = Vec::with_capacity(raw.messages.len());
    for (idx, msg) in raw.messages.into_iter().enumerate() {
        let id = msg.id.unwrap_or(idx as MessageId + 1);

        if let Some(att) = &msg.attachment {
            att.validate()
                .map_err(|e| invalid(format!("message {id}: {e}")))?;
        }

        let expiration = match msg.expiration {
            Some(raw) => Some(resolve_expiration(&raw, now).map_err(|reason| {
                invalid(format!("message {id}: {reason}"))
            })?),
            None => None,
        };

        messages.push(ConversationMessage {
            id,
            direction: msg.direction,
            timestamp: msg.timestamp.unwrap_or(loaded_at),
            body: msg.body,
            attachment: msg.attachment,
            expiration,
        });
    }

    Ok(Conversation {
        title: raw
            .title
            .unwrap_or_else(|| default_title(path)),
        messages,
    })
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Conversation".to_string())
}

fn resolve_expiration(raw: &RawExpiration, now: f64) -> std::result::Result<ExpirationSpec, String> {
    let expires_at_seconds = match (raw.expires_at, raw.expires_in_seconds) {
        (Some(at), _) => at.timestamp_millis() as f64 / 1000.0,
        (None, Some(offset)) if offset.is_finite() => now + offset,
        (None, Some(offset)) => return Err(format!("invalid expires_in_seconds {offset}")),
        (None, None) => return Err("expiration needs expires_at or expires_in_seconds".to_string()),
    };

    let initial_duration_seconds = match u32::try_from(raw.duration_seconds) {
        Ok(d) => d,
        Err(_) if raw.duration_seconds < 0 => {
            warn!(
                duration = raw.duration_seconds,
                "Negative countdown duration, treating message as expired"
            );
            0
        }
        Err(_) => {
            warn!(duration = raw.duration_seconds, "Countdown duration too large, clamping");
            u32::MAX
        }
    };

    Ok(ExpirationSpec {
        expires_at_seconds,
        initial_duration_seconds,
    })
}

/// Convert fractional epoch seconds to a UTC timestamp.
pub fn datetime_from_seconds(seconds: f64) -> Result<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(ChatCellError::InvalidTimestamp(seconds.to_string()));
    }
    Utc.timestamp_millis_opt((seconds * 1000.0) as i64)
        .single()
        .ok_or_else(|| ChatCellError::InvalidTimestamp(seconds.to_string()))
}

/// The conversation shown by `chatcell demo`, with expirations relative to `now`.
pub fn sample_conversation(now: f64) -> Result<Conversation> {
    use Direction::{Incoming, Outgoing};

    let file = |content_type: &str, name: Option<&str>, size: u64| {
        Some(AttachmentDescriptor::new(content_type, name.map(str::to_string), size))
    };
    let expiring = |remaining: f64, duration: u32| {
        Some(ExpirationSpec {
            expires_at_seconds: now + remaining,
            initial_duration_seconds: duration,
        })
    };

    let mut messages = Vec::new();
    let mut push = |direction: Direction,
                    sent: f64,
                    body: Option<&str>,
                    attachment: Option<AttachmentDescriptor>,
                    expiration: Option<ExpirationSpec>|
     -> Result<()> {
        messages.push(ConversationMessage {
            id: messages.len() as MessageId + 1,
            direction,
            timestamp: datetime_from_seconds(now + sent)?,
            body: body.map(str::to_string),
            attachment,
            expiration,
        });
        Ok(())
    };

    push(Incoming, -600.0, Some("Morning! Sending over the files now."), None, None)?;
    push(
        Incoming,
        -590.0,
        Some("Signed contract"),
        file("application/pdf", Some("contract-final-v3.pdf"), 482_133),
        None,
    )?;
    push(Outgoing, -420.0, Some("Thanks, got it."), None, None)?;
    push(
        Outgoing,
        -400.0,
        None,
        file("image/jpeg", Some("whiteboard.jpg"), 2_351_002),
        expiring(-5.0, 60),
    )?;
    push(Incoming, -120.0, Some("This one disappears soon"), None, expiring(10.0, 10))?;
    push(Incoming, -100.0, None, file("audio/aac", None, 88_420), expiring(45.0, 60))?;
    push(
        Outgoing,
        -60.0,
        Some("Backup of the project"),
        file(
            "application/zip",
            Some("project-archive-2024-with-a-very-long-name.zip"),
            734_003_200,
        ),
        expiring(280.0, 300),
    )?;
    push(Incoming, -30.0, Some("See you tomorrow"), None, None)?;
    push(
        Outgoing,
        -10.0,
        None,
        file("video/mp4", Some("clip.mp4"), 15_728_640),
        expiring(3600.0, 3600),
    )?;
    push(
        Incoming,
        -5.0,
        Some("Raw dump attached"),
        file("application/octet-stream", Some("dump.bin"), 512),
        None,
    )?;

    Ok(Conversation {
        title: "Demo conversation".to_string(),
        messages,
    })
}

/// Path used in errors for documents that did not come from a file.
pub fn inline_path() -> PathBuf {
    PathBuf::from("<inline>")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: f64 = 1_700_000_000.0;

    fn parse(json: &str) -> Result<Conversation> {
        parse_conversation(json, &inline_path(), NOW)
    }

    #[test]
    fn test_parse_minimal() {
        let conv = parse(r#"{ "messages": [ { "direction": "incoming", "body": "hi" } ] }"#).unwrap();
        assert_eq!(conv.title, "<inline>");
        assert_eq!(conv.messages.len(), 1);
        let msg = &conv.messages[0];
        assert_eq!(msg.id, 1);
        assert_eq!(msg.direction, Direction::Incoming);
        assert_eq!(msg.timestamp.timestamp(), NOW as i64);
        assert!(msg.expiration.is_none());
    }

    #[test]
    fn test_relative_and_absolute_expiration() {
        let conv = parse(
            r#"{ "title": "t", "messages": [
                { "direction": "outgoing", "expiration": { "expires_in_seconds": 30, "duration_seconds": 60 } },
                { "direction": "incoming", "expiration": { "expires_at": "2023-11-14T22:13:20Z", "duration_seconds": 5 } }
            ] }"#,
        )
        .unwrap();
        let first = conv.messages[0].expiration.unwrap();
        assert_eq!(first.expires_at_seconds, NOW + 30.0);
        assert_eq!(first.initial_duration_seconds, 60);

        let second = conv.messages[1].expiration.unwrap();
        assert_eq!(second.expires_at_seconds, 1_700_000_000.0);
        assert_eq!(second.initial_duration_seconds, 5);
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let conv = parse(
            r#"{ "messages": [
                { "direction": "incoming", "expiration": { "expires_in_seconds": 30, "duration_seconds": -12 } }
            ] }"#,
        )
        .unwrap();
        assert_eq!(conv.messages[0].expiration.unwrap().initial_duration_seconds, 0);
    }

    #[test]
    fn test_expiration_needs_a_time() {
        let err = parse(
            r#"{ "messages": [ { "direction": "incoming", "expiration": { "duration_seconds": 5 } } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ChatCellError::InvalidConversation { .. }));
    }

    #[test]
    fn test_invalid_attachment_rejected() {
        let err = parse(
            r#"{ "messages": [ { "id": 7, "direction": "incoming",
                "attachment": { "content_type": "nonsense", "size": 1 } } ] }"#,
        )
        .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("message 7"), "unexpected error: {text}");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse("{ not json"),
            Err(ChatCellError::InvalidConversation { .. })
        ));
    }

    #[test]
    fn test_sample_conversation() {
        let conv = sample_conversation(NOW).unwrap();
        assert!(conv.messages.len() >= 5);
        assert!(conv.messages.iter().any(|m| m.attachment.is_some()));
        assert!(conv
            .messages
            .iter()
            .filter_map(|m| m.expiration)
            .any(|e| e.expires_at_seconds < NOW));
        for msg in &conv.messages {
            if let Some(att) = &msg.attachment {
                assert!(att.validate().is_ok());
            }
        }
    }

    #[test]
    fn test_datetime_from_seconds() {
        assert_eq!(datetime_from_seconds(NOW).unwrap().timestamp(), NOW as i64);
        assert!(datetime_from_seconds(f64::NAN).is_err());
    }
}
