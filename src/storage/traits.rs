//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::stock::{Category, CategorySnapshot, StockItem, StockSnapshot};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The table is conceptually keyed by (category, name). Writes happen one
/// category at a time and each write is all-or-nothing.
pub trait Storage {
    /// Replaces every stored row for `category` with `items`, stamped with `captured_at`
    ///
    /// Readers observe either the previous item list or the new one, never a mix.
    fn replace_category(
        &mut self,
        category: Category,
        items: &[StockItem],
        captured_at: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Loads the stored snapshot for one category
    ///
    /// Returns None when the category has no stored rows.
    fn load_category(&self, category: Category) -> StorageResult<Option<CategorySnapshot>>;

    /// Loads every category plus the most recent capture time across them
    fn load_all(&self) -> StorageResult<StockSnapshot>;

    /// Counts stored rows across all categories
    fn count_items(&self) -> StorageResult<u64>;
}
