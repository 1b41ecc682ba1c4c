//! reqwest-backed [`RemoteService`] implementation.

use std::time::Duration;

use reqwest::multipart;

use crate::dto::{MessageDto, SendMessageRequest, SendMessageResponse, UploadResponse, UserDto};
use crate::error::{NetError, Result};
use crate::remote::RemoteService;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Authenticated HTTP client for the remote messaging service.
///
/// Holds the bearer token issued by the (out-of-scope) auth handshake.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Build a client for `base_url` (e.g. `https://chat.example.org`).
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    /// Resolve a possibly-relative attachment URL against the base URL.
    fn blob_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{url}", self.base_url)
        }
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        return Err(NetError::Status(response.status().as_u16()));
    }
    Ok(response)
}

impl RemoteService for ApiClient {
    async fn list_users(&self) -> Result<Vec<UserDto>> {
        let response = self
            .http
            .get(self.url("/users"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn fetch_messages(&self, partner_id: &str) -> Result<Vec<MessageDto>> {
        let response = self
            .http
            .get(self.url(&format!("/messages/{partner_id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<SendMessageResponse> {
        let response = self
            .http
            .post(self.url("/messages"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;
        let parsed: SendMessageResponse = check_status(response)?.json().await?;

        if !parsed.success {
            return Err(NetError::Api("server rejected the message".to_string()));
        }

        tracing::debug!(id = ?parsed.id, "message persisted");
        Ok(parsed)
    }

    async fn mark_read(&self, partner_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/messages/{partner_id}/read")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn upload(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(media_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/upload"))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn fetch_blob(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.blob_url(url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check_status(response)?.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_under_api() {
        let client = ApiClient::new("https://chat.example.org/", "t").unwrap();
        assert_eq!(client.url("/users"), "https://chat.example.org/api/users");
        assert_eq!(
            client.url("/messages/u1/read"),
            "https://chat.example.org/api/messages/u1/read"
        );
    }

    #[test]
    fn blob_urls_resolve_relative_paths() {
        let client = ApiClient::new("https://chat.example.org", "t").unwrap();
        assert_eq!(
            client.blob_url("/uploads/a.enc"),
            "https://chat.example.org/uploads/a.enc"
        );
        assert_eq!(
            client.blob_url("https://cdn.example.org/a.enc"),
            "https://cdn.example.org/a.enc"
        );
    }
}
