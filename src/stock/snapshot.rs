//! Snapshots of stored stock

use crate::stock::{Category, StockItem};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The complete set of items for one category at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySnapshot {
    pub category: Category,
    pub items: Vec<StockItem>,
    pub captured_at: DateTime<Utc>,
}

/// Every category's current items, as served by the read API
///
/// Categories without stored rows map to an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct StockSnapshot {
    pub categories: BTreeMap<Category, Vec<StockItem>>,
    /// Most recent capture time across all stored rows
    pub last_updated: Option<DateTime<Utc>>,
}

impl StockSnapshot {
    /// Creates a snapshot with every category present and empty
    pub fn empty() -> Self {
        Self {
            categories: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
            last_updated: None,
        }
    }

    pub fn items(&self, category: Category) -> &[StockItem] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of items across all categories
    pub fn total_items(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}
