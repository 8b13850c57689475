use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

use crate::progress::ProgressMap;

/// Fixed key the progress blob lives under
pub const STORAGE_KEY: &str = "verdant_terrarium";

// ============================================================================
// KEY-VALUE STORE
// ============================================================================

/// String blobs by key. `set` fully overwrites.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed store (one row per key)
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read key {}", key))?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                params![key, value],
            )
            .with_context(|| format!("Failed to write key {}", key))?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// PROGRESS BLOB
// ============================================================================

/// Read the progress map stored under `key`
///
/// A missing key or malformed JSON both mean "no prior state". Only store
/// failures are errors.
pub fn load_progress(store: &dyn KeyValueStore, key: &str) -> Result<ProgressMap> {
    let Some(saved) = store.get(key)? else {
        return Ok(ProgressMap::new());
    };

    match serde_json::from_str::<ProgressMap>(&saved) {
        Ok(progress) => Ok(progress),
        Err(e) => {
            log::warn!("Failed to parse saved garden state, resetting: {}", e);
            Ok(ProgressMap::new())
        }
    }
}

/// Overwrite the progress map stored under `key`
pub fn save_progress(store: &mut dyn KeyValueStore, key: &str, progress: &ProgressMap) -> Result<()> {
    let serialized = serde_json::to_string(progress).context("Failed to serialize garden state")?;
    store.set(key, &serialized)
}
