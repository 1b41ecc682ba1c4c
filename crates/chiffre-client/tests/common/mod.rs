//! In-memory remote service and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use chiffre_client::Session;
use chiffre_net::dto::{
    MessageDto, SendMessageRequest, SendMessageResponse, UploadResponse, UserDto,
};
use chiffre_net::{NetError, RemoteService, Result};
use chiffre_shared::types::{DeliveryStatus, User};
use chiffre_store::{KeyPolicy, KeyStore};

/// Scriptable in-memory stand-in for the remote service.
#[derive(Default)]
pub struct FakeRemote {
    pub users: Mutex<Vec<UserDto>>,
    pub messages: Mutex<HashMap<String, Vec<MessageDto>>>,
    pub sent: Mutex<Vec<SendMessageRequest>>,
    pub uploads: Mutex<Vec<(String, String)>>,
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
    pub read_acks: Mutex<Vec<String>>,
    pub fail_fetch: AtomicBool,
    pub fail_send: AtomicBool,
}

impl FakeRemote {
    pub fn with_users(users: Vec<UserDto>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }

    pub fn put_messages(&self, partner_id: &str, messages: Vec<MessageDto>) {
        self.messages
            .lock()
            .unwrap()
            .insert(partner_id.to_string(), messages);
    }

    pub fn sent_requests(&self) -> Vec<SendMessageRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl RemoteService for FakeRemote {
    async fn list_users(&self) -> Result<Vec<UserDto>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(NetError::Status(503));
        }
        Ok(self.users.lock().unwrap().clone())
    }

    async fn fetch_messages(&self, partner_id: &str) -> Result<Vec<MessageDto>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(NetError::Status(503));
        }
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(partner_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<SendMessageResponse> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(NetError::Status(500));
        }
        self.sent.lock().unwrap().push(request.clone());
        Ok(SendMessageResponse {
            success: true,
            id: Some(format!("srv-{}", self.sent.lock().unwrap().len())),
        })
    }

    async fn mark_read(&self, partner_id: &str) -> Result<()> {
        self.read_acks.lock().unwrap().push(partner_id.to_string());
        Ok(())
    }

    async fn upload(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse> {
        let url = format!("/uploads/{file_name}");
        self.uploads
            .lock()
            .unwrap()
            .push((file_name.to_string(), media_type.to_string()));
        self.blobs.lock().unwrap().insert(url.clone(), bytes);
        Ok(UploadResponse {
            url,
            media_type: media_type.to_string(),
        })
    }

    async fn fetch_blob(&self, url: &str) -> Result<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(NetError::Status(404))
    }
}

pub fn user_dto(id: &str) -> UserDto {
    UserDto {
        id: id.to_string(),
        username: format!("user-{id}"),
        avatar: String::new(),
        is_online: true,
    }
}

pub fn message_dto(
    id: &str,
    sender_id: &str,
    text: &str,
    timestamp: DateTime<Utc>,
    is_mine: bool,
    status: DeliveryStatus,
    is_secret: bool,
) -> MessageDto {
    MessageDto {
        id: id.to_string(),
        sender_id: sender_id.to_string(),
        text: text.to_string(),
        attachment_url: None,
        attachment_type: None,
        timestamp,
        is_mine,
        status: Some(status),
        is_secret,
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_717_200_000 + secs, 0).unwrap()
}

pub fn current_user() -> User {
    User {
        id: "me".into(),
        username: "moi".into(),
        avatar: String::new(),
        is_online: true,
    }
}

/// A session backed by a throwaway key store. The tempdir must outlive it.
pub fn session_with_policy(policy: KeyPolicy) -> (tempfile::TempDir, Session) {
    let dir = tempfile::tempdir().unwrap();
    let keystore = KeyStore::open_at(&dir.path().join("keys.db"), policy).unwrap();
    (dir, Session::new(current_user(), keystore))
}
