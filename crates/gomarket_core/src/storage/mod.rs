//! Local key-value persistence used by the cart.
//!
//! # Responsibility
//! - Define the `KeyValueStore` contract (raw string per key).
//! - Provide SQLite, in-memory and no-op implementations.
//! - Run fire-and-forget writes on a background worker.
//!
//! # Invariants
//! - Stores are shareable across threads (`Send + Sync`); the cart reads on
//!   the caller thread while the writer thread persists.
//! - Values are opaque strings; serialization belongs to the caller.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;
mod writer;

pub use memory::{MemoryKeyValueStore, NoopKeyValueStore};
pub use sqlite::SqliteKeyValueStore;
pub use writer::PersistWriter;

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by key-value store implementations.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Device-local string store keyed by string.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` when absent.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
}
