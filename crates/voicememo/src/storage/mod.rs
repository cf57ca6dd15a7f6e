//! Storage layer for voicememo.
//!
//! Application state is a flat key-value namespace of JSON strings. The
//! [`PersistentStore`] trait is the seam between the account and recording
//! logic and the storage technology: [`SqliteStore`] persists to disk and
//! [`MemoryStore`] backs tests.

pub mod keys;
pub mod migrations;
pub mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};

/// A string key-value store.
///
/// Every operation acts on one key; there are no transactions across keys.
/// [`PersistentStore::update`] is atomic for its key, including against other
/// processes sharing the same database file.
pub trait PersistentStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn remove(&self, key: &str) -> Result<()>;

    /// Replace the value under `key` with what `edit` returns for the current
    /// one. No other writer can touch `key` between the read and the write.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails or `edit` does; the stored value
    /// is unchanged in either case.
    fn update(
        &self,
        key: &str,
        edit: &mut dyn FnMut(Option<&str>) -> Result<String>,
    ) -> Result<()>;
}

/// JSON helpers over any [`PersistentStore`].
pub trait StoreExt: PersistentStore {
    /// Read and decode a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored value is not valid JSON
    /// for `T`.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)?
            .map(|raw| serde_json::from_str(&raw).map_err(Error::from))
            .transpose()
    }

    /// Encode and store a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }

    /// Decode the JSON value under `key` (default when absent), apply `edit`
    /// and store the result in one atomic update.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value is not valid JSON for `T` or the
    /// update fails.
    fn update_json<T, R>(&self, key: &str, edit: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut edit = Some(edit);
        let mut outcome = None;
        self.update(key, &mut |current| {
            let mut value: T = current
                .map(serde_json::from_str)
                .transpose()?
                .unwrap_or_default();
            if let Some(edit) = edit.take() {
                outcome = Some(edit(&mut value));
            }
            Ok(serde_json::to_string(&value)?)
        })?;
        outcome.ok_or_else(|| Error::internal(format!("update of {key} did not run")))
    }
}

impl<S: PersistentStore + ?Sized> StoreExt for S {}

/// How long a writer waits for another process's transaction to finish.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const UPSERT_SQL: &str = r"
    INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

const SELECT_SQL: &str = "SELECT value FROM entries WHERE key = ?1";

/// `SQLite`-backed key-value store.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&mut conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::StorageLock(e.to_string()))
    }

    /// List stored keys starting with `prefix`, in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM entries WHERE substr(key, 1, ?2) = ?1 ORDER BY key")?;
        let prefix_len = i64::try_from(prefix.chars().count()).unwrap_or(i64::MAX);
        let keys = stmt
            .query_map(params![prefix, prefix_len], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_entries: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_entries,
            db_size_bytes,
        })
    }
}

impl PersistentStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "get");
        let value = self
            .conn()?
            .query_row(SELECT_SQL, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        trace!(key, bytes = value.len(), "set");
        self.conn()?.execute(UPSERT_SQL, params![key, value])?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        trace!(key, "remove");
        self.conn()?
            .execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        edit: &mut dyn FnMut(Option<&str>) -> Result<String>,
    ) -> Result<()> {
        trace!(key, "update");
        let mut conn = self.conn()?;
        // IMMEDIATE takes the write lock up front so a second process blocks
        // here instead of failing at commit
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current: Option<String> = tx
            .query_row(SELECT_SQL, [key], |row| row.get(0))
            .optional()?;
        let value = edit(current.as_deref())?;
        tx.execute(UPSERT_SQL, params![key, value])?;
        tx.commit()?;
        Ok(())
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Total number of stored keys.
    pub total_entries: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the map lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self
            .map
            .read()
            .map_err(|e| Error::StorageLock(e.to_string()))?
            .len())
    }

    /// Whether nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the map lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .map
            .read()
            .map_err(|e| Error::StorageLock(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .write()
            .map_err(|e| Error::StorageLock(e.to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.map
            .write()
            .map_err(|e| Error::StorageLock(e.to_string()))?
            .remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        edit: &mut dyn FnMut(Option<&str>) -> Result<String>,
    ) -> Result<()> {
        let mut map = self
            .map
            .write()
            .map_err(|e| Error::StorageLock(e.to_string()))?;
        let value = edit(map.get(key).map(String::as_str))?;
        map.insert(key.to_string(), value);
        Ok(())
    }
}
