use rusqlite::{OptionalExtension, params};
use std::path::Path;
use thiserror::Error;

use super::database::Database;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// String key/value store scoped to one chat session.
pub struct SessionStorage {
    db: Database,
}

impl SessionStorage {
    /// Open (or create) storage backed by a file.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let storage = Self {
            db: Database::new(path)?,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        let storage = Self {
            db: Database::in_memory()?,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.db.connection().execute(
            "CREATE TABLE IF NOT EXISTS session_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM session_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.connection().execute(
            "INSERT OR REPLACE INTO session_storage (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.db
            .connection()
            .execute("DELETE FROM session_storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    #[cfg(test)]
    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 =
            self.db
                .connection()
                .query_row("SELECT COUNT(*) FROM session_storage", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_remove() {
        let storage = SessionStorage::in_memory().unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.count().unwrap(), 1);

        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.db");

        SessionStorage::with_path(&path)
            .unwrap()
            .set_item("chat-data", "{}")
            .unwrap();

        let reopened = SessionStorage::with_path(&path).unwrap();
        assert_eq!(reopened.get_item("chat-data").unwrap().as_deref(), Some("{}"));
    }
}
