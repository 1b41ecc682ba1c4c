use thiserror::Error;

use chiffre_net::NetError;
use chiffre_shared::{AttachmentError, CryptoError};
use chiffre_store::StoreError;

/// Errors surfaced by the sync/send pipelines.
///
/// Per-message decrypt failures never reach this type; they collapse to
/// the locked placeholder inside the cycle. What propagates here aborts a
/// single operation (one send, one poll cycle), never the session.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Net(#[from] NetError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),
}
