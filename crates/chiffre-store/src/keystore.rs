//! Key resolution policy layer.
//!
//! Maps logical key ids to actual key material. Two policies:
//!
//! - **Fixed**: one key derived from the embedded application secret;
//!   every id resolves to it.
//! - **Rotating**: one freshly generated key per UTC calendar day. Asking
//!   for today's key creates and persists it on first use; asking for any
//!   other absent day fails with [`StoreError::KeyNotFound`], permanently.
//!   Messages encrypted under a lost day key stay locked by design and are
//!   surfaced to the user as an explicit placeholder.
//!
//! Callers serialize access (the client wraps the store in a mutex), so
//! the check-generate-persist sequence is single-flight per key id.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use chiffre_shared::constants::{DAY_ID_FORMAT, FIXED_KEY_ID, MASTER_SECRET};
use chiffre_shared::crypto::{self, SymmetricKey};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::StoredKey;

/// Which keying scheme this device uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Single long-lived key derived from the embedded master secret.
    Fixed,
    /// Per-day generated keys; old-day ciphertext dies with its key.
    Rotating,
}

/// Resolves logical key ids to key material and persists generated keys.
pub struct KeyStore {
    db: Database,
    policy: KeyPolicy,
    master_key: SymmetricKey,
}

/// Diagnostic snapshot of the key store, for the settings/debug surface.
#[derive(Debug, Clone, Serialize)]
pub struct KeyStoreInfo {
    pub algorithm: &'static str,
    pub policy: &'static str,
    pub total_keys: usize,
    pub key_exists_for_today: bool,
}

impl KeyStore {
    /// Open the default on-device store with the given policy.
    pub fn open(policy: KeyPolicy) -> Result<Self> {
        Self::with_database(Database::new()?, policy)
    }

    /// Open a store at an explicit path (tests, custom layouts).
    pub fn open_at(path: &Path, policy: KeyPolicy) -> Result<Self> {
        Self::with_database(Database::open_at(path)?, policy)
    }

    /// Wrap an already-open database.
    pub fn with_database(db: Database, policy: KeyPolicy) -> Result<Self> {
        let master_key = crypto::derive_master_key(MASTER_SECRET);
        let store = Self {
            db,
            policy,
            master_key,
        };

        // The fixed slot is persisted so the exported form survives
        // restarts, same as generated day keys.
        if policy == KeyPolicy::Fixed && store.db.get_key(FIXED_KEY_ID)?.is_none() {
            store.persist(FIXED_KEY_ID, &store.master_key)?;
        }

        Ok(store)
    }

    /// Today's key id under the rotating policy (UTC calendar day).
    pub fn today_id() -> String {
        Utc::now().format(DAY_ID_FORMAT).to_string()
    }

    /// The (key id, key) pair new encryption operations must use.
    ///
    /// Rotating policy: generates and persists today's key on first use.
    pub fn encryption_key(&self) -> Result<(String, SymmetricKey)> {
        match self.policy {
            KeyPolicy::Fixed => Ok((FIXED_KEY_ID.to_string(), self.master_key)),
            KeyPolicy::Rotating => {
                let day_id = Self::today_id();
                let key = self.resolve(&day_id)?;
                Ok((day_id, key))
            }
        }
    }

    /// Resolve a key id from a received payload.
    ///
    /// Fixed policy never fails; rotating policy generates today's key on
    /// demand and fails closed for any other absent day.
    pub fn resolve(&self, key_id: &str) -> Result<SymmetricKey> {
        if self.policy == KeyPolicy::Fixed {
            return Ok(self.master_key);
        }

        if let Some(stored) = self.db.get_key(key_id)? {
            return decode_key(&stored);
        }

        if key_id == Self::today_id() {
            tracing::info!(key_id, "generating new day key");
            let key = crypto::generate_symmetric_key();
            self.persist(key_id, &key)?;
            return Ok(key);
        }

        Err(StoreError::KeyNotFound(key_id.to_string()))
    }

    /// Diagnostic info for the settings screen.
    pub fn debug_info(&self) -> Result<KeyStoreInfo> {
        Ok(KeyStoreInfo {
            algorithm: "XChaCha20-Poly1305",
            policy: match self.policy {
                KeyPolicy::Fixed => "fixed",
                KeyPolicy::Rotating => "rotating",
            },
            total_keys: self.db.count_keys()?,
            key_exists_for_today: self.db.get_key(&Self::today_id())?.is_some(),
        })
    }

    fn persist(&self, key_id: &str, key: &SymmetricKey) -> Result<()> {
        self.db.put_key(&StoredKey {
            key_id: key_id.to_string(),
            key_hex: hex::encode(key),
            created_at: Utc::now(),
        })
    }
}

fn decode_key(stored: &StoredKey) -> Result<SymmetricKey> {
    let bytes = hex::decode(&stored.key_hex)
        .map_err(|_| StoreError::InvalidKeyMaterial(stored.key_id.clone()))?;
    bytes
        .try_into()
        .map_err(|_| StoreError::InvalidKeyMaterial(stored.key_id.clone()))
}
