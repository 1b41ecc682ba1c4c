//! Self-describing encrypted attachment container.
//!
//! A file is packed together with its declared media type before
//! encryption, so decryption on the far side needs no external metadata to
//! hand the rendering layer a displayable blob.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ATTACHMENT_SIZE;
use crate::crypto::SymmetricKey;
use crate::envelope::BinaryEnvelope;
use crate::error::AttachmentError;
use crate::types::AttachmentKind;

/// A file's bytes plus its original media type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentContainer {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl AttachmentContainer {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }

    /// Classification of the ORIGINAL media type, usable even after the
    /// bytes have been encrypted into an opaque blob.
    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::classify(&self.media_type)
    }

    /// Pack and encrypt into one transportable blob.
    pub fn seal(&self, key_id: &str, key: &SymmetricKey) -> Result<Vec<u8>, AttachmentError> {
        if self.data.len() > MAX_ATTACHMENT_SIZE {
            return Err(AttachmentError::TooLarge {
                size: self.data.len(),
                max: MAX_ATTACHMENT_SIZE,
            });
        }

        let packed = bincode::serialize(self).map_err(|_| AttachmentError::Malformed)?;
        Ok(BinaryEnvelope::seal(&packed, key_id, key)?)
    }

    /// Reverse [`seal`](Self::seal) given an already-parsed envelope and the
    /// resolved key.
    pub fn open(envelope: &BinaryEnvelope, key: &SymmetricKey) -> Result<Self, AttachmentError> {
        let packed = envelope.open(key)?;
        bincode::deserialize(&packed).map_err(|_| AttachmentError::Malformed)
    }
}

/// Parse an encrypted attachment blob, distinguishing "not encrypted at
/// all" from a corrupted envelope.
pub fn parse_blob(blob: &[u8]) -> Result<BinaryEnvelope, AttachmentError> {
    if !blob.starts_with(crate::constants::ATTACHMENT_MAGIC) {
        return Err(AttachmentError::NotEncrypted);
    }
    BinaryEnvelope::from_blob(blob).map_err(|_| AttachmentError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_symmetric_key;
    use crate::error::CryptoError;

    #[test]
    fn attachment_round_trip() {
        let key = generate_symmetric_key();
        let container = AttachmentContainer::new("image/png", vec![0x89, 0x50, 0x4E, 0x47, 0x00]);

        let blob = container.seal("2024-06-01", &key).unwrap();
        let envelope = parse_blob(&blob).unwrap();
        assert_eq!(envelope.key_id, "2024-06-01");

        let opened = AttachmentContainer::open(&envelope, &key).unwrap();
        assert_eq!(opened, container);
        assert_eq!(opened.kind(), AttachmentKind::Image);
    }

    #[test]
    fn plain_bytes_are_not_encrypted() {
        assert!(matches!(
            parse_blob(b"GIF89a...."),
            Err(AttachmentError::NotEncrypted)
        ));
    }

    #[test]
    fn truncated_blob_is_malformed() {
        let key = generate_symmetric_key();
        let container = AttachmentContainer::new("video/mp4", vec![1; 64]);
        let blob = container.seal("fixed", &key).unwrap();

        assert!(matches!(
            parse_blob(&blob[..5]),
            Err(AttachmentError::Malformed)
        ));
    }

    #[test]
    fn wrong_key_is_a_crypto_failure() {
        let container = AttachmentContainer::new("application/pdf", vec![9; 32]);
        let blob = container.seal("fixed", &generate_symmetric_key()).unwrap();
        let envelope = parse_blob(&blob).unwrap();

        assert!(matches!(
            AttachmentContainer::open(&envelope, &generate_symmetric_key()),
            Err(AttachmentError::Crypto(CryptoError::DecryptionFailed))
        ));
    }

    #[test]
    fn oversized_attachment_is_rejected() {
        let oversized = AttachmentContainer {
            media_type: "application/octet-stream".into(),
            data: vec![0; MAX_ATTACHMENT_SIZE + 1],
        };
        assert!(matches!(
            oversized.seal("fixed", &generate_symmetric_key()),
            Err(AttachmentError::TooLarge { .. })
        ));
    }
}
