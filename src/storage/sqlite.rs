//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::stock::{Category, CategorySnapshot, StockItem, StockSnapshot};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::StockError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StockError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, StockError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, StockError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_items(&self, category: Category) -> StorageResult<Vec<(StockItem, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, stock, price, last_updated FROM stock WHERE category = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![category.to_db_string()], |row| {
                Ok((
                    StockItem {
                        name: row.get(0)?,
                        stock: row.get(1)?,
                        price: row.get(2)?,
                    },
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

impl Storage for SqliteStorage {
    fn replace_category(
        &mut self,
        category: Category,
        items: &[StockItem],
        captured_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let stamp = format_timestamp(captured_at);
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM stock WHERE category = ?1",
            params![category.to_db_string()],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO stock (category, name, stock, price, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for item in items {
                insert.execute(params![
                    category.to_db_string(),
                    item.name,
                    item.stock,
                    item.price,
                    stamp
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_category(&self, category: Category) -> StorageResult<Option<CategorySnapshot>> {
        let rows = self.load_items(category)?;

        let captured_at = match rows.first() {
            Some((_, stamp)) => parse_timestamp(stamp)?,
            None => return Ok(None),
        };

        Ok(Some(CategorySnapshot {
            category,
            items: rows.into_iter().map(|(item, _)| item).collect(),
            captured_at,
        }))
    }

    fn load_all(&self) -> StorageResult<StockSnapshot> {
        let mut snapshot = StockSnapshot::empty();

        for category in Category::ALL {
            let items = self
                .load_items(category)?
                .into_iter()
                .map(|(item, _)| item)
                .collect();
            snapshot.categories.insert(category, items);
        }

        let latest: Option<String> =
            self.conn
                .query_row("SELECT MAX(last_updated) FROM stock", [], |row| row.get(0))?;

        snapshot.last_updated = latest.as_deref().map(parse_timestamp).transpose()?;

        Ok(snapshot)
    }

    fn count_items(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM stock", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Formats a timestamp so that lexical order matches chronological order
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("Invalid timestamp '{}': {}", s, e)))
}
