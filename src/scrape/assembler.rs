//! Snapshot assembly
//!
//! Collects per-section results into per-category stock, picks the next run
//! delay, and writes each category's snapshot.

use crate::scrape::duration::{DEFAULT_DELAY_SECS, MIN_DELAY_SECS};
use crate::scrape::section::SectionExtract;
use crate::stock::{Category, StockItem};
use crate::storage::{Storage, StorageResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Seconds until each category found on the page next changes
pub type NextUpdateMap = BTreeMap<Category, u64>;

/// The delay chosen for the next scrape and the category that set it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextRun {
    pub delay_secs: u64,
    /// None when no category reported an interval
    pub category: Option<Category>,
}

impl NextRun {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Per-category results of one scrape, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// Items per category; every category is present, possibly empty
    pub stock: BTreeMap<Category, Vec<StockItem>>,
    pub next_updates: NextUpdateMap,
}

impl Assembly {
    /// Groups section extracts by category
    ///
    /// Sections with unrecognized labels are ignored. A category seen in more
    /// than one section gets the items of all of them and the shortest interval.
    pub fn from_sections(sections: &[SectionExtract]) -> Self {
        let mut stock: BTreeMap<Category, Vec<StockItem>> =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        let mut next_updates = NextUpdateMap::new();

        for section in sections {
            let Some(category) = section.category else {
                tracing::info!("Unrecognized category '{}', skipping", section.label);
                continue;
            };

            let seconds = section.next_update_secs();
            next_updates
                .entry(category)
                .and_modify(|current| *current = (*current).min(seconds))
                .or_insert(seconds);

            if !section.has_list {
                tracing::warn!("No item list found for category '{}'", section.label);
            }

            let items = section.items();
            tracing::debug!("Category {}: {} items", category, items.len());
            stock.entry(category).or_default().extend(items);
        }

        Self {
            stock,
            next_updates,
        }
    }

    /// Picks the shortest interval across categories
    ///
    /// Falls back to the default delay when no category reported one; the
    /// result is never below the minimum delay.
    pub fn next_run(&self) -> NextRun {
        let shortest = self
            .next_updates
            .iter()
            .min_by_key(|(_, seconds)| **seconds)
            .map(|(category, seconds)| (*category, *seconds));

        match shortest {
            Some((category, seconds)) => NextRun {
                delay_secs: seconds.max(MIN_DELAY_SECS),
                category: Some(category),
            },
            None => NextRun {
                delay_secs: DEFAULT_DELAY_SECS,
                category: None,
            },
        }
    }

    /// Number of items per category
    pub fn item_counts(&self) -> BTreeMap<Category, usize> {
        self.stock.iter().map(|(c, items)| (*c, items.len())).collect()
    }

    pub fn total_items(&self) -> usize {
        self.stock.values().map(Vec::len).sum()
    }

    /// Replaces every category's stored snapshot
    ///
    /// Each category is written in its own atomic replace; categories absent
    /// from the page are stored empty.
    pub fn persist<S: Storage>(
        &self,
        storage: &mut S,
        captured_at: DateTime<Utc>,
    ) -> StorageResult<usize> {
        for (category, items) in &self.stock {
            storage.replace_category(*category, items, captured_at)?;
        }
        Ok(self.total_items())
    }
}
