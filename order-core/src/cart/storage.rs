//! Durable cart snapshot storage
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `cart` | `storefront.cart` | JSON array of `CartLine` |
//!
//! The whole cart is rewritten on every mutation; a missing or unreadable
//! snapshot means an empty cart.

use redb::{Database, ReadableDatabase, TableDefinition};
use shared::{AppError, CartLine, ErrorCode};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for the cart snapshot: key = namespace, value = JSON-serialized `Vec<CartLine>`
const CART_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("cart");

/// Fixed namespace the cart snapshot lives under
pub const CART_KEY: &str = "storefront.cart";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => {
                AppError::with_message(ErrorCode::CartCorrupted, e.to_string())
            }
            other => AppError::storage(other.to_string()),
        }
    }
}

/// Where the cart snapshot is kept between sessions
pub trait CartStorage: Send + Sync {
    /// Load the snapshot; `Ok(None)` when nothing was saved yet
    fn load(&self) -> StorageResult<Option<Vec<CartLine>>>;

    /// Replace the snapshot
    fn save(&self, lines: &[CartLine]) -> StorageResult<()>;
}

/// Cart storage backed by redb
#[derive(Clone)]
pub struct RedbCartStorage {
    db: Arc<Database>,
}

impl RedbCartStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Create an in-memory database (tests, ephemeral sessions)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CART_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Store raw bytes under the cart key
    pub fn save_raw(&self, bytes: &[u8]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CART_TABLE)?;
            table.insert(CART_KEY, bytes)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl CartStorage for RedbCartStorage {
    fn load(&self) -> StorageResult<Option<Vec<CartLine>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CART_TABLE)?;

        match table.get(CART_KEY)? {
            Some(value) => {
                let lines: Vec<CartLine> = serde_json::from_slice(value.value())?;
                Ok(Some(lines))
            }
            None => Ok(None),
        }
    }

    fn save(&self, lines: &[CartLine]) -> StorageResult<()> {
        let value = serde_json::to_vec(lines)?;
        self.save_raw(&value)
    }
}
