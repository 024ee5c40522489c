//! Key-value local store over SQLite
//!
//! One row per key, JSON-encoded values. Each `set` replaces the whole
//! value atomically; multi-key writes go through a single transaction.
//! This is the durability layer every operation falls back on when the
//! remote store is unreachable.

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

use super::error::{StorageError, StorageResult};
use crate::config::Config;

/// Schema for the key-value table.
const KV_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// SQLite-backed key-value store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at the configured database path.
    pub fn open(config: &Config) -> StorageResult<Self> {
        Self::open_at(&config.db_path())
    }

    /// Open the store at a specific path, creating parent directories.
    pub fn open_at(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// Open an in-memory store (used by tests).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        conn.execute_batch(KV_SCHEMA)?;
        Ok(())
    }

    /// Get a value by key. `None` when the key has never been set.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?")?;
        let raw: Option<String> = stmt.query_row(params![key], |row| row.get(0)).ok();

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Set a single key, replacing any previous value atomically.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value)?;
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at)
             VALUES (?, ?, datetime('now'))",
            params![key, json],
        )?;
        Ok(())
    }

    /// Set several keys in one transaction (a partial update of the store).
    pub fn set_all(&self, entries: &[(&str, serde_json::Value)]) -> StorageResult<()> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        let tx = conn.transaction()?;
        for (key, value) in entries {
            let json = serde_json::to_string(value)?;
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at)
                 VALUES (?, ?, datetime('now'))",
                params![key, json],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Remove keys. Missing keys are not an error.
    pub fn remove(&self, keys: &[&str]) -> StorageResult<()> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        let tx = conn.transaction()?;
        for key in keys {
            tx.execute("DELETE FROM kv WHERE key = ?", params![key])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Approximate bytes used by stored keys and values.
    pub fn bytes_in_use(&self) -> StorageResult<u64> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        let bytes: i64 = conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(key) + LENGTH(value)), 0) FROM kv",
            [],
            |row| row.get(0),
        )?;
        Ok(bytes.max(0) as u64)
    }
}
