//! Process-scoped session context.
//!
//! One [`Session`] exists per authenticated user. It owns the local
//! conversation cache, the counterpart list, and the key store, and is
//! injected into the sync engine and send pipeline rather than accessed as
//! a global. Created on authenticate, cleared on logout.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chiffre_net::RemoteService;
use chiffre_shared::crypto::SymmetricKey;
use chiffre_shared::envelope::TextEnvelope;
use chiffre_shared::types::{Conversation, ConversationId, DeliveryStatus, Message, User};
use chiffre_store::{KeyStore, StoreError};

use crate::error::ClientError;

struct SessionInner {
    current_user: User,
    conversations: Mutex<Vec<Conversation>>,
    users: Mutex<Vec<User>>,
    keystore: Mutex<KeyStore>,
}

/// Cheap-to-clone handle to the session state shared by every component.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(current_user: User, keystore: KeyStore) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                current_user,
                conversations: Mutex::new(Vec::new()),
                users: Mutex::new(Vec::new()),
                keystore: Mutex::new(keystore),
            }),
        }
    }

    pub fn current_user(&self) -> &User {
        &self.inner.current_user
    }

    /// Snapshot of the merged conversation list, most recent first.
    pub fn conversations(&self) -> Vec<Conversation> {
        self.lock_conversations().clone()
    }

    pub fn get_conversation(&self, id: &ConversationId) -> Option<Conversation> {
        self.lock_conversations().iter().find(|c| &c.id == id).cloned()
    }

    /// Snapshot of the known counterpart list.
    pub fn users(&self) -> Vec<User> {
        self.lock_users().clone()
    }

    /// Remove a conversation from the local cache only. The server copy is
    /// untouched and the next cycle may resurrect it.
    pub fn delete_conversation(&self, id: &ConversationId) -> bool {
        let mut conversations = self.lock_conversations();
        let before = conversations.len();
        conversations.retain(|c| &c.id != id);
        conversations.len() != before
    }

    /// Insert an empty secret conversation with a known counterpart so it
    /// shows up before any traffic exists. The reconciliation merge rule
    /// preserves it until the server echoes a first message.
    ///
    /// Returns `None` when the user id is unknown.
    pub fn create_secret_chat(&self, user_id: &str) -> Option<ConversationId> {
        let id = ConversationId::secret(user_id);
        if let Some(existing) = self.get_conversation(&id) {
            return Some(existing.id);
        }

        let user = self.lock_users().iter().find(|u| u.id == user_id).cloned()?;

        let mut conversations = self.lock_conversations();
        conversations.insert(0, Conversation::empty(id.clone(), user));
        Some(id)
    }

    /// Zero the unread badge locally, then acknowledge on the server.
    /// A failed acknowledgement is logged; the next poll re-converges.
    pub async fn mark_read<R: RemoteService>(&self, remote: &R, id: &ConversationId) {
        {
            let mut conversations = self.lock_conversations();
            if let Some(conversation) = conversations.iter_mut().find(|c| &c.id == id) {
                conversation.unread_count = 0;
            }
        }

        if let Err(error) = remote.mark_read(id.partner_id()).await {
            tracing::warn!(conversation = %id, %error, "failed to acknowledge read state");
        }
    }

    /// Drop all cached state on logout. Device keys stay persisted so
    /// earlier ciphertext survives a re-login.
    pub fn clear(&self) {
        self.lock_conversations().clear();
        self.lock_users().clear();
    }

    // ------------------------------------------------------------------
    // Key store access (single-flight: one mutex guards check-generate-
    // persist for a given key id)
    // ------------------------------------------------------------------

    /// The (key id, key) new encryption operations must use.
    pub fn encryption_key(&self) -> Result<(String, SymmetricKey), StoreError> {
        self.lock_keystore().encryption_key()
    }

    /// Resolve the key for a received payload.
    pub fn resolve_key(&self, key_id: &str) -> Result<SymmetricKey, StoreError> {
        self.lock_keystore().resolve(key_id)
    }

    /// Encrypt outgoing text to its wire form.
    pub fn seal_text(&self, plaintext: &str) -> Result<String, ClientError> {
        let (key_id, key) = self.encryption_key()?;
        Ok(TextEnvelope::seal(plaintext, &key_id, &key)?.to_wire())
    }

    // ------------------------------------------------------------------
    // Mutations from the sync engine and send pipeline
    // ------------------------------------------------------------------

    pub(crate) fn store_users(&self, users: Vec<User>) {
        *self.lock_users() = users;
    }

    /// Replace the conversation list with a freshly synthesized one,
    /// preserving purely optimistic conversations the snapshot has not
    /// caught up with: any prior conversation whose id is absent from the
    /// new list and which holds no server-confirmed message is carried
    /// over. Once the snapshot contains the id, the server copy wins.
    pub(crate) fn merge_conversations(&self, mut fresh: Vec<Conversation>) {
        let mut conversations = self.lock_conversations();

        for previous in conversations.iter() {
            let unconfirmed = previous.messages.iter().all(|m| m.is_optimistic);
            if unconfirmed && !fresh.iter().any(|c| c.id == previous.id) {
                fresh.push(previous.clone());
            }
        }

        sort_conversations(&mut fresh);
        *conversations = fresh;
    }

    /// Append an optimistic message, creating the conversation if this is
    /// its first message, and recompute the preview fields. The only
    /// synchronous mutation visible to the user before confirmation.
    pub(crate) fn append_optimistic(&self, id: &ConversationId, message: Message) {
        let mut conversations = self.lock_conversations();

        if let Some(conversation) = conversations.iter_mut().find(|c| &c.id == id) {
            conversation.messages.push(message);
            conversation.recompute_derived();
        } else {
            let user = self
                .lock_users()
                .iter()
                .find(|u| u.id == id.partner_id())
                .cloned()
                .unwrap_or_else(|| placeholder_user(id.partner_id()));
            conversations.push(Conversation::synthesize(id.clone(), user, vec![message]));
        }

        sort_conversations(&mut conversations);
    }

    /// Flip an optimistic message to `Failed` after a dispatch error.
    pub(crate) fn mark_message_failed(&self, id: &ConversationId, message_id: &str) {
        let mut conversations = self.lock_conversations();
        if let Some(conversation) = conversations.iter_mut().find(|c| &c.id == id) {
            if let Some(message) = conversation
                .messages
                .iter_mut()
                .find(|m| m.id == message_id)
            {
                message.status = DeliveryStatus::Failed;
            }
        }
    }

    // Poisoning is ignored: every critical section leaves the cache in a
    // consistent state, so the data is still usable after a panic.
    fn lock_conversations(&self) -> MutexGuard<'_, Vec<Conversation>> {
        self.inner
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_users(&self) -> MutexGuard<'_, Vec<User>> {
        self.inner.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_keystore(&self) -> MutexGuard<'_, KeyStore> {
        self.inner
            .keystore
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Most recent first; ties broken by id for deterministic output.
pub(crate) fn sort_conversations(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| {
        b.preview_timestamp
            .cmp(&a.preview_timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn placeholder_user(user_id: &str) -> User {
    User {
        id: user_id.to_string(),
        username: user_id.to_string(),
        avatar: String::new(),
        is_online: false,
    }
}
