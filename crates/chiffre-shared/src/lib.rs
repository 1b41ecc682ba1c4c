//! # chiffre-shared
//!
//! Domain types and cryptographic primitives shared by every Chiffre crate:
//! the conversation/message model, the XChaCha20-Poly1305 engine, the
//! text/binary envelope codecs, and the attachment container.

pub mod attachment;
pub mod constants;
pub mod crypto;
pub mod envelope;
pub mod types;

mod error;

pub use error::{AttachmentError, ChiffreError, CryptoError};
