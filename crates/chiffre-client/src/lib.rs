//! # chiffre-client
//!
//! The client-side synchronization core: a [`Session`] holding the local
//! view of all conversations, the [`SyncEngine`] that reconciles it
//! against the polled server snapshot, and the [`SendPipeline`] that shows
//! sent messages optimistically before the server has echoed them back.
//!
//! Rendering, routing, and the auth handshake live outside this crate and
//! talk to it through [`Session`] snapshots and the pipelines.

pub mod attachments;
pub mod send;
pub mod session;
pub mod sync;

mod error;

pub use attachments::{AttachmentPipeline, FetchedAttachment};
pub use error::ClientError;
pub use send::{OutgoingFile, SendPipeline};
pub use session::Session;
pub use sync::SyncEngine;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide tracing subscriber.
///
/// Call once from the embedding application's entry point.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("chiffre_client=debug,chiffre_net=debug,chiffre_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
