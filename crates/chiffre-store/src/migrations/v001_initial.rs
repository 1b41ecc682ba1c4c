//! v001 -- Initial schema creation.
//!
//! Creates the single `keys` table: exported symmetric keys addressed by
//! key id (a calendar day under the rotating policy, or the fixed slot).

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Key material
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS keys (
    key_id     TEXT PRIMARY KEY NOT NULL,  -- 'YYYY-MM-DD' or 'fixed'
    key_hex    TEXT NOT NULL,              -- hex-encoded 32-byte symmetric key
    created_at TEXT NOT NULL               -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
