use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    FILE_PREVIEW_LABEL, NO_MESSAGES_LABEL, PHOTO_PREVIEW_LABEL, SECRET_CHAT_CREATED_LABEL,
    SECRET_PREFIX, VIDEO_PREVIEW_LABEL,
};

/// A counterpart user as reported by the remote service.
///
/// Owned by the server; cached read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub is_online: bool,
}

/// Coarse attachment classification, derived from the original file's
/// declared media type (never from uploaded bytes, which may be ciphertext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    File,
}

impl AttachmentKind {
    /// Classify a MIME type string.
    pub fn classify(media_type: &str) -> Self {
        if media_type.starts_with("image/") {
            Self::Image
        } else if media_type.starts_with("video/") {
            Self::Video
        } else {
            Self::File
        }
    }

    /// Preview glyph shown when a message carries only this attachment.
    pub fn preview_label(self) -> &'static str {
        match self {
            Self::Image => PHOTO_PREVIEW_LABEL,
            Self::Video => VIDEO_PREVIEW_LABEL,
            Self::File => FILE_PREVIEW_LABEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
    /// Local-only: the optimistic dispatch failed. Never sent by the server.
    Failed,
}

/// A single chat message. Immutable once created except for
/// [`DeliveryStatus`] transitions and the one-time decrypt-in-place applied
/// when loading from an encrypted source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    /// Plaintext once decrypted; the locked placeholder if the key is gone.
    pub text: String,
    pub attachment_url: Option<String>,
    pub attachment_kind: Option<AttachmentKind>,
    pub timestamp: DateTime<Utc>,
    pub is_mine: bool,
    pub status: DeliveryStatus,
    pub is_secret: bool,
    /// Local-only: set on records shown before the server has echoed an
    /// equivalent persisted message. Never true for polled records.
    #[serde(default)]
    pub is_optimistic: bool,
}

impl Message {
    /// Whether this message counts toward the unread badge.
    pub fn is_unread(&self) -> bool {
        !self.is_mine && self.status != DeliveryStatus::Read
    }

    /// Short label used as the conversation preview when this is the last
    /// message: the text, or a kind glyph for attachment-only messages.
    pub fn preview_label(&self) -> String {
        if !self.text.is_empty() {
            return self.text.clone();
        }
        match self.attachment_kind {
            Some(kind) => kind.preview_label().to_string(),
            None => NO_MESSAGES_LABEL.to_string(),
        }
    }
}

/// Conversation identifier.
///
/// The plain conversation with a counterpart reuses their user id; the
/// secret conversation derives `secret_<userId>`. At most two conversations
/// exist per counterpart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn plain(user_id: &str) -> Self {
        Self(user_id.to_string())
    }

    pub fn secret(user_id: &str) -> Self {
        Self(format!("{SECRET_PREFIX}{user_id}"))
    }

    pub fn is_secret(&self) -> bool {
        self.0.starts_with(SECRET_PREFIX)
    }

    /// The counterpart user id, with any secret prefix stripped.
    pub fn partner_id(&self) -> &str {
        self.0.strip_prefix(SECRET_PREFIX).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A synthesized view over one counterpart's plain or secret traffic.
///
/// Recomputed from polled state every reconciliation cycle; identity
/// survives across cycles only by id equality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub user: User,
    pub preview_text: String,
    pub preview_timestamp: DateTime<Utc>,
    pub unread_count: u32,
    pub messages: Vec<Message>,
    pub is_secret: bool,
}

impl Conversation {
    /// Build a conversation record from an ordered message subsequence.
    ///
    /// Messages must already be in chronological (server) order.
    pub fn synthesize(id: ConversationId, user: User, messages: Vec<Message>) -> Self {
        let is_secret = id.is_secret();
        let mut conversation = Self {
            id,
            user,
            preview_text: String::new(),
            preview_timestamp: Utc::now(),
            unread_count: 0,
            messages,
            is_secret,
        };
        conversation.recompute_derived();
        conversation
    }

    /// An empty conversation, shown before the server has echoed any traffic.
    pub fn empty(id: ConversationId, user: User) -> Self {
        Self::synthesize(id, user, Vec::new())
    }

    /// Recompute preview text, preview timestamp, and unread count from the
    /// current message list.
    pub fn recompute_derived(&mut self) {
        match self.messages.last() {
            Some(last) => {
                self.preview_text = last.preview_label();
                self.preview_timestamp = last.timestamp;
            }
            None => {
                self.preview_text = if self.is_secret {
                    SECRET_CHAT_CREATED_LABEL.to_string()
                } else {
                    NO_MESSAGES_LABEL.to_string()
                };
            }
        }
        self.unread_count = self.messages.iter().filter(|m| m.is_unread()).count() as u32;
    }
}
