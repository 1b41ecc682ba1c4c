//! Typed rows for the store schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted symmetric key, exported to hex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredKey {
    /// `YYYY-MM-DD` under the rotating policy, or the fixed slot id.
    pub key_id: String,
    /// Hex-encoded 32-byte key material.
    pub key_hex: String,
    pub created_at: DateTime<Utc>,
}
