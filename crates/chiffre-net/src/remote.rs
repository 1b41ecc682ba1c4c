//! The remote service seam.
//!
//! The sync engine and send pipeline are generic over this trait, so tests
//! drive them against an in-memory service instead of a live server.

use crate::dto::{MessageDto, SendMessageRequest, SendMessageResponse, UploadResponse, UserDto};
use crate::error::Result;

/// The subset of the remote service the core consumes.
///
/// Implementors: [`ApiClient`](crate::ApiClient) in production, in-memory
/// fakes in tests.
#[allow(async_fn_in_trait)]
pub trait RemoteService {
    /// Full counterpart list.
    async fn list_users(&self) -> Result<Vec<UserDto>>;

    /// Full ordered message history with one counterpart (chronological
    /// ascending; no delta or cursor).
    async fn fetch_messages(&self, partner_id: &str) -> Result<Vec<MessageDto>>;

    /// Persist one message (text and/or attachment reference).
    async fn send_message(&self, request: &SendMessageRequest) -> Result<SendMessageResponse>;

    /// Acknowledge read state for a counterpart's messages.
    async fn mark_read(&self, partner_id: &str) -> Result<()>;

    /// Upload a file body; returns the stored URL and served media type.
    async fn upload(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse>;

    /// Download an attachment body by its stored URL.
    async fn fetch_blob(&self, url: &str) -> Result<Vec<u8>>;
}
