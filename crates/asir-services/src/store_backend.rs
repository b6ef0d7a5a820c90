//! Key-value storage backends for the governorate blob.
//!
//! The repository only needs whole-value reads and writes under a string key,
//! so every backend is a tiny KV store: in-memory (tests), a directory of JSON
//! files, or a single SQLite table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use asir_core::config::{StorageConfig, StorageKind};
use asir_core::error::{DatabaseError, RusqliteErrorExt};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

/// Errors from the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored blob exists but cannot be parsed as a governorate list.
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    /// The backend failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The governorate list could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Corruption(msg) => Self::Corrupt(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<StoreError> for asir_core::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt(msg) => DatabaseError::Corruption(msg).into(),
            StoreError::Storage(msg) | StoreError::Serialization(msg) => {
                DatabaseError::QueryFailed(msg).into()
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whole-value key-value storage.
///
/// Implementations don't need to be Sync - the repository serializes access
/// through a mutex.
pub trait StorageBackend: Send {
    /// Read the value under `key`, `None` if absent.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite the value under `key`.
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Process-local backend. Clones share the same map, so a test can keep a
/// handle and inspect what the repository wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// never sees a half-written blob.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StoreError::storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        std::fs::write(&tmp, value).map_err(|e| {
            StoreError::storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            StoreError::storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        tracing::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// SQLite-backed key-value table.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::from(e.into_database_error()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::from(e.into_database_error()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                "#,
            )
            .map_err(|e| StoreError::from(e.into_database_error()))
    }
}

impl StorageBackend for SqliteBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| StoreError::from(e.into_database_error()))
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                r#"
                INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![key, value, updated_at],
            )
            .map_err(|e| StoreError::from(e.into_database_error()))?;

        tracing::debug!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|e| StoreError::from(e.into_database_error()))?;
        Ok(())
    }
}

/// Build the backend named in the storage config.
pub fn open_backend(
    config: &StorageConfig,
    data_dir: &Path,
) -> StoreResult<Box<dyn StorageBackend>> {
    let backend: Box<dyn StorageBackend> = match config.backend {
        StorageKind::Memory => Box::new(MemoryBackend::new()),
        StorageKind::File => Box::new(FileBackend::new(data_dir)?),
        StorageKind::Sqlite => {
            std::fs::create_dir_all(data_dir).map_err(|e| {
                StoreError::storage(format!("Failed to create {}: {}", data_dir.display(), e))
            })?;
            Box::new(SqliteBackend::open(data_dir.join("asir-explorer.db"))?)
        }
    };
    tracing::info!("Opened {:?} storage backend", config.backend);
    Ok(backend)
}
