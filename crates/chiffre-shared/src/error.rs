use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChiffreError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed: invalid ciphertext or wrong key")]
    DecryptionFailed,

    #[error("No key stored for id '{0}'")]
    KeyNotFound(String),

    #[error("Payload does not match the envelope format")]
    MalformedPayload,

    #[error("Invalid key length")]
    InvalidKeyLength,
}

/// Attachment failures are kept distinct from plain crypto errors so the
/// rendering layer can show "decryption failed" rather than a blank blob.
#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("Blob is not an encrypted attachment")]
    NotEncrypted,

    #[error("Attachment container is corrupted")]
    Malformed,

    #[error("Attachment too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Attachment crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
