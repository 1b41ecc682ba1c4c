//! The optimistic send pipeline.
//!
//! A sent message becomes visible locally the instant `send` appends it,
//! with plaintext text and status `Sent`; the (possibly ciphertext)
//! payload is dispatched to the server afterwards. A dispatch failure
//! marks the local message `Failed` but never retracts it.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use chiffre_net::dto::SendMessageRequest;
use chiffre_net::RemoteService;
use chiffre_shared::types::{ConversationId, DeliveryStatus, Message};

use crate::attachments::AttachmentPipeline;
use crate::error::ClientError;
use crate::session::Session;

/// A file picked for sending: its bytes plus the declared media type.
#[derive(Debug, Clone)]
pub struct OutgoingFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl OutgoingFile {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk. The caller supplies the media type; nothing
    /// here sniffs bytes.
    pub async fn read(path: &Path, media_type: impl Into<String>) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        Ok(Self {
            file_name,
            media_type: media_type.into(),
            bytes,
        })
    }
}

/// Sends user messages, optimistically updating the session first.
pub struct SendPipeline<R: RemoteService> {
    remote: Arc<R>,
    session: Session,
    attachments: AttachmentPipeline<R>,
}

impl<R: RemoteService> SendPipeline<R> {
    pub fn new(remote: Arc<R>, session: Session) -> Self {
        let attachments = AttachmentPipeline::new(Arc::clone(&remote), session.clone());
        Self {
            remote,
            session,
            attachments,
        }
    }

    /// Send text and/or a file to a conversation.
    ///
    /// Secrecy follows the conversation id's shape: a `secret_` prefix
    /// means the text and any attachment are encrypted before they leave
    /// the device. The returned message is the optimistic local record.
    pub async fn send(
        &self,
        conversation_id: &ConversationId,
        text: Option<String>,
        file: Option<OutgoingFile>,
    ) -> Result<Message, ClientError> {
        let is_secret = conversation_id.is_secret();
        let receiver_id = conversation_id.partner_id().to_string();

        let mut attachment_url = None;
        let mut attachment_kind = None;
        if let Some(ref file) = file {
            let (url, kind) = self.attachments.upload(file, is_secret).await?;
            attachment_url = Some(url);
            attachment_kind = Some(kind);
        }

        let text = text.unwrap_or_default();
        let wire_text = if is_secret && !text.is_empty() {
            self.session.seal_text(&text)?
        } else {
            text.clone()
        };

        // Optimistic record: always the plaintext, never the ciphertext.
        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id: self.session.current_user().id.clone(),
            text,
            attachment_url: attachment_url.clone(),
            attachment_kind,
            timestamp: Utc::now(),
            is_mine: true,
            status: DeliveryStatus::Sent,
            is_secret,
            is_optimistic: true,
        };
        self.session.append_optimistic(conversation_id, message.clone());

        let request = SendMessageRequest {
            receiver_id,
            text: wire_text,
            attachment_url,
            attachment_type: attachment_kind,
            is_secret,
        };

        if let Err(error) = self.remote.send_message(&request).await {
            tracing::warn!(
                conversation = %conversation_id,
                message_id = %message.id,
                %error,
                "dispatch failed, optimistic message marked as failed"
            );
            self.session.mark_message_failed(conversation_id, &message.id);
        }

        Ok(message)
    }
}
