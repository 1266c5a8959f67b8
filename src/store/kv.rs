use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::{params, Connection, OptionalExtension};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-records-manager";
/// SQLite file name stored inside the application data directory.
const KV_FILE_NAME: &str = "records.sqlite";

/// Minimal byte-oriented key-value store backed by a single SQLite table.
/// The roster never needs relational queries, so one `kv` table keyed by a
/// constant name is the whole persistence surface; the serialized mirror of
/// the student list lives under a single key.
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open (and lazily create) the store at its default location under the
    /// user's home directory.
    pub fn open_default() -> Result<Self> {
        let path = data_dir()?.join(KV_FILE_NAME);
        Self::open_at(&path)
    }

    /// Open the store at an explicit path. Tests point this at a temp
    /// directory to exercise real on-disk round-trips.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
        let conn = Connection::open(path).context("failed to open key-value store")?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Fully in-memory store for unit tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory store")?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Read the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .context("failed to read key-value entry")
    }

    /// Write `value` under `key`, replacing any previous value.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .context("failed to write key-value entry")?;
        Ok(())
    }
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create kv table")?;
    Ok(())
}

/// Resolve the application data directory inside the user's home. Shared by
/// the key-value store and the log-file bootstrap in `main`.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::KvStore;

    #[test]
    fn get_missing_key_is_none() {
        let kv = KvStore::open_in_memory().unwrap();
        assert_eq!(kv.get("students").unwrap(), None);
    }

    #[test]
    fn put_then_get_round_trips() {
        let kv = KvStore::open_in_memory().unwrap();
        kv.put("students", "[]").unwrap();
        assert_eq!(kv.get("students").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn put_replaces_existing_value() {
        let kv = KvStore::open_in_memory().unwrap();
        kv.put("students", "old").unwrap();
        kv.put("students", "new").unwrap();
        assert_eq!(kv.get("students").unwrap().as_deref(), Some("new"));
    }
}
