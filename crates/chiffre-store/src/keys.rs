//! CRUD operations for [`StoredKey`] records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::models::StoredKey;

impl Database {
    /// Insert or replace a key. Last writer wins: the pathological
    /// double-generation case persists one of two equivalent fresh keys.
    pub fn put_key(&self, key: &StoredKey) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO keys (key_id, key_hex, created_at)
             VALUES (?1, ?2, ?3)",
            params![key.key_id, key.key_hex, key.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Fetch a key by id, or `None` if it was never persisted.
    pub fn get_key(&self, key_id: &str) -> Result<Option<StoredKey>> {
        let row = self
            .conn()
            .query_row(
                "SELECT key_id, key_hex, created_at FROM keys WHERE key_id = ?1",
                params![key_id],
                row_to_key,
            )
            .optional()?;

        match row {
            Some((key_id, key_hex, ts_str)) => {
                let created_at: DateTime<Utc> =
                    DateTime::parse_from_rfc3339(&ts_str).map(|dt| dt.with_timezone(&Utc))?;
                Ok(Some(StoredKey {
                    key_id,
                    key_hex,
                    created_at,
                }))
            }
            None => Ok(None),
        }
    }

    /// Number of persisted keys.
    pub fn count_keys(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM keys", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All key ids, oldest first.
    pub fn list_key_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT key_id FROM keys ORDER BY created_at ASC")?;

        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}

fn row_to_key(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}
