/// Application name
pub const APP_NAME: &str = "Chiffre";

/// XChaCha20-Poly1305 nonce size in bytes
pub const NONCE_SIZE: usize = 24;

/// Symmetric key size in bytes (for XChaCha20-Poly1305)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Maximum attachment size in bytes (50 MiB)
pub const MAX_ATTACHMENT_SIZE: usize = 50 * 1024 * 1024;

/// Reconciliation poll interval in milliseconds
pub const POLL_INTERVAL_MS: u64 = 2_000;

/// Conversation id prefix marking a secret (end-to-end encrypted) chat
pub const SECRET_PREFIX: &str = "secret_";

/// Key id stored for the fixed-key policy slot
pub const FIXED_KEY_ID: &str = "fixed";

/// Day-id format for rotating keys (calendar day, UTC)
pub const DAY_ID_FORMAT: &str = "%Y-%m-%d";

/// Key derivation context (BLAKE3)
pub const KDF_CONTEXT_MASTER_KEY: &str = "chiffre-master-key-v1";

/// Application master secret for the fixed-key policy.
///
/// Embedded in every client build, so it protects content from the server
/// only, not from anyone holding the binary. Kept as a deliberate policy
/// choice for the demo-grade deployment; the rotating policy replaces it.
pub const MASTER_SECRET: &[u8] = b"CHIFFRE_MASTER_SECRET_2024_DEMO_KEY_MUST_BE_32_BYTES!!";

/// Magic prefix identifying an encrypted attachment blob
pub const ATTACHMENT_MAGIC: &[u8; 4] = b"CHF1";

/// Placeholder shown when a secret message's key is lost or decryption fails
pub const LOCKED_MESSAGE_LABEL: &str = "\u{1F512} Message unavailable (key lost)";

/// Preview label for a conversation with no messages
pub const NO_MESSAGES_LABEL: &str = "No messages";

/// Preview label shown when a freshly created secret chat has no traffic yet
pub const SECRET_CHAT_CREATED_LABEL: &str = "Secret chat created";

/// Kind-specific preview glyphs for attachment-only messages
pub const PHOTO_PREVIEW_LABEL: &str = "\u{1F4F7} Photo";
pub const VIDEO_PREVIEW_LABEL: &str = "\u{1F3AC} Video";
pub const FILE_PREVIEW_LABEL: &str = "\u{1F4CE} File";
