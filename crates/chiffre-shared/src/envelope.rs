//! Wire/at-rest envelopes for encrypted content.
//!
//! Text travels as a small JSON object `{key_id, nonce, ciphertext}` so it
//! fits anywhere a plain string does; any string that does not decode to
//! that shape is treated as legacy plaintext and passed through unchanged.
//! Binary attachments use a magic-prefixed bincode envelope with the same
//! fields.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::constants::ATTACHMENT_MAGIC;
use crate::crypto::{self, SymmetricKey};
use crate::error::CryptoError;

/// JSON envelope carrying one encrypted text unit.
///
/// `key_id` selects the key that must reverse the payload: a calendar day
/// under the rotating policy, or the fixed slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextEnvelope {
    pub key_id: String,
    /// Base64-encoded 24-byte nonce.
    pub nonce: String,
    /// Base64-encoded ciphertext (includes the Poly1305 tag).
    pub ciphertext: String,
}

impl TextEnvelope {
    /// Encrypt `plaintext` under `key`, drawing a fresh random nonce.
    pub fn seal(plaintext: &str, key_id: &str, key: &SymmetricKey) -> Result<Self, CryptoError> {
        let (nonce, ciphertext) = crypto::encrypt(key, plaintext.as_bytes())?;
        Ok(Self {
            key_id: key_id.to_string(),
            nonce: BASE64.encode(nonce),
            ciphertext: BASE64.encode(ciphertext),
        })
    }

    /// Decrypt back to the original string. Fails closed on a wrong key,
    /// tampered payload, or undecodable fields.
    pub fn open(&self, key: &SymmetricKey) -> Result<String, CryptoError> {
        let nonce = BASE64
            .decode(&self.nonce)
            .map_err(|_| CryptoError::MalformedPayload)?;
        let ciphertext = BASE64
            .decode(&self.ciphertext)
            .map_err(|_| CryptoError::MalformedPayload)?;

        let plaintext = crypto::decrypt(key, &nonce, &ciphertext)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Strict syntactic probe: decode a wire string into an envelope, or
    /// `None` if it is legacy plaintext. Callers route `None` through
    /// unchanged rather than attempting decryption.
    pub fn from_wire(raw: &str) -> Option<Self> {
        if !raw.trim_start().starts_with('{') {
            return None;
        }
        let envelope: Self = serde_json::from_str(raw).ok()?;
        if envelope.key_id.is_empty() || envelope.nonce.is_empty() || envelope.ciphertext.is_empty()
        {
            return None;
        }
        Some(envelope)
    }

    /// Serialize for the wire.
    pub fn to_wire(&self) -> String {
        // Three plain string fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Bincode envelope for binary content, prefixed with [`ATTACHMENT_MAGIC`]
/// so encrypted blobs are cheap to distinguish from plain files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BinaryEnvelope {
    pub key_id: String,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl BinaryEnvelope {
    /// Encrypt `data` under `key` and frame the result as one blob.
    pub fn seal(data: &[u8], key_id: &str, key: &SymmetricKey) -> Result<Vec<u8>, CryptoError> {
        let (nonce, ciphertext) = crypto::encrypt(key, data)?;
        let envelope = Self {
            key_id: key_id.to_string(),
            nonce: nonce.to_vec(),
            ciphertext,
        };

        let body = bincode::serialize(&envelope).map_err(|_| CryptoError::EncryptionFailed)?;
        let mut blob = Vec::with_capacity(ATTACHMENT_MAGIC.len() + body.len());
        blob.extend_from_slice(ATTACHMENT_MAGIC);
        blob.extend_from_slice(&body);
        Ok(blob)
    }

    /// Parse a blob back into an envelope. A missing magic prefix or an
    /// undecodable body is a malformed payload, not a crypto failure.
    pub fn from_blob(blob: &[u8]) -> Result<Self, CryptoError> {
        let body = blob
            .strip_prefix(ATTACHMENT_MAGIC.as_slice())
            .ok_or(CryptoError::MalformedPayload)?;
        bincode::deserialize(body).map_err(|_| CryptoError::MalformedPayload)
    }

    /// Decrypt the enveloped bytes.
    pub fn open(&self, key: &SymmetricKey) -> Result<Vec<u8>, CryptoError> {
        crypto::decrypt(key, &self.nonce, &self.ciphertext)
    }
}
