//! Attachment upload/download orchestration.
//!
//! The pure container transform lives in `chiffre_shared::attachment`;
//! this module wires it to the key store and the upload/download
//! endpoints.

use std::sync::Arc;

use chiffre_net::RemoteService;
use chiffre_shared::attachment::{self, AttachmentContainer};
use chiffre_shared::types::AttachmentKind;
use chiffre_shared::AttachmentError;

use crate::error::ClientError;
use crate::send::OutgoingFile;
use crate::session::Session;

/// A downloaded attachment, ready for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedAttachment {
    /// The blob was never encrypted; serve it as downloaded.
    Plain { bytes: Vec<u8> },
    /// Decrypted content with its original media type restored.
    Decrypted {
        bytes: Vec<u8>,
        media_type: String,
        kind: AttachmentKind,
    },
}

/// Encrypt-before-upload and download-then-decrypt for file attachments.
pub struct AttachmentPipeline<R: RemoteService> {
    remote: Arc<R>,
    session: Session,
}

impl<R: RemoteService> AttachmentPipeline<R> {
    pub fn new(remote: Arc<R>, session: Session) -> Self {
        Self { remote, session }
    }

    /// Upload a file, encrypting it first when the target conversation is
    /// secret. Returns the stored URL and the attachment kind classified
    /// from the ORIGINAL media type (uploaded ciphertext is opaque).
    pub async fn upload(
        &self,
        file: &OutgoingFile,
        secret: bool,
    ) -> Result<(String, AttachmentKind), ClientError> {
        let kind = AttachmentKind::classify(&file.media_type);

        let (file_name, media_type, body) = if secret {
            let (key_id, key) = self.session.encryption_key()?;
            let blob = AttachmentContainer::new(file.media_type.clone(), file.bytes.clone())
                .seal(&key_id, &key)?;
            (
                format!("{}.enc", file.file_name),
                "application/octet-stream".to_string(),
                blob,
            )
        } else {
            (
                file.file_name.clone(),
                file.media_type.clone(),
                file.bytes.clone(),
            )
        };

        let response = self.remote.upload(&file_name, &media_type, body).await?;

        tracing::info!(url = %response.url, ?kind, secret, "attachment uploaded");
        Ok((response.url, kind))
    }

    /// Download an attachment and reverse the encryption transform if one
    /// was applied. Key loss, tampering, and container corruption come
    /// back as distinct [`AttachmentError`]s so the UI can render an
    /// explicit failure state instead of a blank blob.
    pub async fn fetch(&self, url: &str) -> Result<FetchedAttachment, ClientError> {
        let bytes = self.remote.fetch_blob(url).await?;

        let envelope = match attachment::parse_blob(&bytes) {
            Ok(envelope) => envelope,
            Err(AttachmentError::NotEncrypted) => return Ok(FetchedAttachment::Plain { bytes }),
            Err(error) => return Err(error.into()),
        };

        let key = self.session.resolve_key(&envelope.key_id)?;
        let container = AttachmentContainer::open(&envelope, &key)?;

        let kind = container.kind();
        Ok(FetchedAttachment::Decrypted {
            bytes: container.data,
            media_type: container.media_type,
            kind,
        })
    }
}
