//! The reconciliation engine.
//!
//! Polls the full remote snapshot on a fixed interval, decrypts secret
//! traffic, partitions each counterpart's history into a plain and a
//! secret conversation, and merges the result into the session without
//! clobbering optimistic sends the server has not echoed yet.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use chiffre_net::dto::{MessageDto, UserDto};
use chiffre_net::RemoteService;
use chiffre_shared::constants::{LOCKED_MESSAGE_LABEL, POLL_INTERVAL_MS};
use chiffre_shared::envelope::TextEnvelope;
use chiffre_shared::types::{Conversation, ConversationId, Message, User};

use crate::error::ClientError;
use crate::session::Session;

/// Reconciles the local conversation cache against the polled server
/// snapshot. One cycle at a time: the loop awaits each cycle before the
/// next tick fires, so reconciliations never race each other.
pub struct SyncEngine<R: RemoteService> {
    remote: Arc<R>,
    session: Session,
}

impl<R: RemoteService> SyncEngine<R> {
    pub fn new(remote: Arc<R>, session: Session) -> Self {
        Self { remote, session }
    }

    /// Poll until the shutdown channel flips to `true` (logout) or its
    /// sender is dropped. A failed cycle keeps the previous local state;
    /// the timer retries it on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(Duration::from_millis(POLL_INTERVAL_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = self.sync_once().await {
                        tracing::warn!(%error, "reconciliation cycle failed, keeping previous state");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("sync engine stopped");
                        return;
                    }
                }
            }
        }
    }

    /// One full poll-fetch-decrypt-merge pass.
    pub async fn sync_once(&self) -> Result<(), ClientError> {
        let user_dtos = self.remote.list_users().await?;

        let mut fresh: Vec<Conversation> = Vec::new();
        for user_dto in &user_dtos {
            let user = to_user(user_dto);
            let history = self.remote.fetch_messages(&user.id).await?;

            let mut plain = Vec::new();
            let mut secret = Vec::new();
            for dto in &history {
                let message = self.to_message(dto);
                if message.is_secret {
                    secret.push(message);
                } else {
                    plain.push(message);
                }
            }

            if !plain.is_empty() {
                fresh.push(Conversation::synthesize(
                    ConversationId::plain(&user.id),
                    user.clone(),
                    plain,
                ));
            }
            if !secret.is_empty() {
                fresh.push(Conversation::synthesize(
                    ConversationId::secret(&user.id),
                    user.clone(),
                    secret,
                ));
            }
        }

        self.session.store_users(user_dtos.iter().map(to_user).collect());
        self.session.merge_conversations(fresh);
        Ok(())
    }

    fn to_message(&self, dto: &MessageDto) -> Message {
        let text = if dto.is_secret {
            self.decrypt_text(&dto.text)
        } else {
            dto.text.clone()
        };

        Message {
            id: dto.id.clone(),
            sender_id: dto.sender_id.clone(),
            text,
            attachment_url: dto.attachment_url.clone(),
            attachment_kind: dto.attachment_type,
            timestamp: dto.timestamp,
            is_mine: dto.is_mine,
            status: dto.delivery_status(),
            is_secret: dto.is_secret,
            is_optimistic: false,
        }
    }

    /// Decrypt one secret text unit. Legacy plaintext passes through
    /// unchanged; a lost key or failed authentication collapses to the
    /// locked placeholder so a single bad message never aborts the cycle.
    fn decrypt_text(&self, raw: &str) -> String {
        let Some(envelope) = TextEnvelope::from_wire(raw) else {
            return raw.to_string();
        };

        let key = match self.session.resolve_key(&envelope.key_id) {
            Ok(key) => key,
            Err(error) => {
                tracing::debug!(key_id = %envelope.key_id, %error, "key unavailable");
                return LOCKED_MESSAGE_LABEL.to_string();
            }
        };

        match envelope.open(&key) {
            Ok(plaintext) => plaintext,
            Err(error) => {
                tracing::debug!(key_id = %envelope.key_id, %error, "decryption failed");
                LOCKED_MESSAGE_LABEL.to_string()
            }
        }
    }
}

fn to_user(dto: &UserDto) -> User {
    User {
        id: dto.id.clone(),
        username: dto.username.clone(),
        avatar: dto.avatar.clone(),
        is_online: dto.is_online,
    }
}
