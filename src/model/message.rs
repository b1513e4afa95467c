//! Messages as displayed in a conversation row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::AttachmentDescriptor;

/// Stable identifier of a message within a conversation.
pub type MessageId = u64;

/// Whether a message was received or sent by the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn from_incoming(is_incoming: bool) -> Self {
        if is_incoming {
            Self::Incoming
        } else {
            Self::Outgoing
        }
    }

    pub fn is_incoming(self) -> bool {
        matches!(self, Self::Incoming)
    }
}

/// Countdown parameters of a disappearing message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpirationSpec {
    /// Absolute expiry time in seconds since the Unix epoch.
    pub expires_at_seconds: f64,
    /// Total span of the countdown.
    pub initial_duration_seconds: u32,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: MessageId,
    pub direction: Direction,
    /// Time the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Text body, if any.
    pub body: Option<String>,
    /// File attachment, if any.
    pub attachment: Option<AttachmentDescriptor>,
    /// Present only for disappearing messages.
    pub expiration: Option<ExpirationSpec>,
}

impl ConversationMessage {
    pub fn is_disappearing(&self) -> bool {
        self.expiration.is_some()
    }
}
