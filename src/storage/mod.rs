//! Storage module for persisting stock snapshots
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Atomic per-category snapshot replacement
//! - Reading single categories or the full stock with its last update time

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::StockError;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Storage handle shared between the scrape pipeline and the read API
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StockError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, StockError> {
    SqliteStorage::new(path)
}

/// Opens a storage database wrapped for sharing across tasks
pub fn open_shared_storage(path: &Path) -> Result<SharedStorage, StockError> {
    Ok(Arc::new(Mutex::new(open_storage(path)?)))
}
