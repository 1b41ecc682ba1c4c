//! Wire shapes for the remote service REST contract.
//!
//! The service speaks camelCase JSON; these types are the only place that
//! convention leaks into the codebase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chiffre_shared::types::{AttachmentKind, DeliveryStatus};

/// `GET /users` element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub is_online: bool,
}

/// `GET /messages/{partnerId}` element.
///
/// `text` is ciphertext (the JSON envelope) when `is_secret` is set and
/// the sender encrypted it; decryption happens in the sync engine, never
/// here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub sender_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub attachment_type: Option<AttachmentKind>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_mine: bool,
    #[serde(default)]
    pub status: Option<DeliveryStatus>,
    #[serde(default)]
    pub is_secret: bool,
}

impl MessageDto {
    /// Delivery status, defaulting to `Sent` when the server omits it.
    pub fn delivery_status(&self) -> DeliveryStatus {
        self.status.unwrap_or(DeliveryStatus::Sent)
    }
}

/// `POST /messages` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_type: Option<AttachmentKind>,
    pub is_secret: bool,
}

/// `POST /messages` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub id: Option<String>,
}

/// `POST /upload` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
}
