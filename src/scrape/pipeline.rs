//! Scrape cycle orchestration
//!
//! One cycle fetches the page, locates the stock container, extracts every
//! section, and replaces the stored snapshots. The returned report carries
//! the delay the scheduler should wait before the next cycle.

use crate::config::ScraperConfig;
use crate::schedule::CycleRunner;
use crate::scrape::assembler::{Assembly, NextRun, NextUpdateMap};
use crate::scrape::fetcher::{build_http_client, fetch_page};
use crate::scrape::locator::{find_sections, locate_container};
use crate::scrape::section::{extract_section, SectionExtract};
use crate::stock::Category;
use crate::storage::{SharedStorage, StorageError};
use crate::StockError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::Html;
use std::collections::BTreeMap;
use std::time::Duration;

/// Sections read from a page, and how the container was found
#[derive(Debug, Clone)]
pub struct PageExtract {
    pub hypothesis: &'static str,
    /// Candidate sections in the container, including ones without a heading
    pub sections_seen: usize,
    pub sections: Vec<SectionExtract>,
}

/// Outcome of a successful cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub captured_at: DateTime<Utc>,
    /// Container hypothesis that matched
    pub hypothesis: &'static str,
    /// Sections with a heading
    pub sections_found: usize,
    pub item_counts: BTreeMap<Category, usize>,
    pub next_updates: NextUpdateMap,
    pub next_run: NextRun,
}

impl CycleReport {
    /// Delay before the next cycle should run
    pub fn next_delay(&self) -> Duration {
        self.next_run.delay()
    }

    pub fn total_items(&self) -> usize {
        self.item_counts.values().sum()
    }
}

/// Extracts all category sections from raw page markup
///
/// Fails with [`StockError::StructureNotFound`] when no container hypothesis
/// matches. Sections without a heading are skipped.
pub fn extract_page(html: &str, url: &str) -> Result<PageExtract, StockError> {
    let document = Html::parse_document(html);

    let container = locate_container(&document).ok_or_else(|| {
        tracing::error!("No stock container found in page from {}", url);
        StockError::StructureNotFound {
            url: url.to_string(),
        }
    })?;
    tracing::info!(
        "Stock container found (hypothesis: {})",
        container.hypothesis
    );

    let candidates = find_sections(container.element);
    let mut sections = Vec::with_capacity(candidates.len());

    for candidate in &candidates {
        match extract_section(*candidate) {
            Some(section) => {
                tracing::info!("Processing section: {}", section.label);
                sections.push(section);
            }
            None => tracing::debug!("Section without heading, skipping"),
        }
    }

    Ok(PageExtract {
        hypothesis: container.hypothesis,
        sections_seen: candidates.len(),
        sections,
    })
}

/// Runs scrape cycles against the configured page
pub struct StockScraper {
    config: ScraperConfig,
    client: Client,
    storage: SharedStorage,
}

impl StockScraper {
    /// Creates a new scraper
    ///
    /// # Arguments
    ///
    /// * `config` - The fetch target configuration
    /// * `storage` - Storage the snapshots are written to
    pub fn new(config: ScraperConfig, storage: SharedStorage) -> Result<Self, StockError> {
        let client = build_http_client(&config).map_err(|source| StockError::Http {
            url: config.target_url.clone(),
            source,
        })?;

        Ok(Self {
            config,
            client,
            storage,
        })
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Runs one full cycle: fetch, extract, persist
    pub async fn scrape_once(&self) -> Result<CycleReport, StockError> {
        let captured_at = Utc::now();
        let url = self.config.target_url.as_str();

        let page = fetch_page(&self.client, url).await?;
        tracing::info!(
            "Fetched {} (status {}, {} bytes)",
            page.final_url,
            page.status_code,
            page.body.len()
        );

        let extract = extract_page(&page.body, url)?;
        tracing::info!(
            "Sections processed: {} of {} candidates",
            extract.sections.len(),
            extract.sections_seen
        );

        let assembly = Assembly::from_sections(&extract.sections);
        for (category, count) in assembly.item_counts() {
            tracing::info!("{}: {} items", category, count);
        }

        let saved = {
            let mut storage = self.storage.lock().map_err(|_| StorageError::LockPoisoned)?;
            assembly.persist(&mut *storage, captured_at)?
        };
        tracing::info!("Saved {} items (captured at {})", saved, captured_at);

        let next_run = assembly.next_run();
        match next_run.category {
            Some(category) => tracing::info!(
                "Next update in {}s (category: {})",
                next_run.delay_secs,
                category
            ),
            None => tracing::warn!(
                "No update intervals detected, using {}s",
                next_run.delay_secs
            ),
        }
        tracing::debug!("Intervals per category: {:?}", assembly.next_updates);

        Ok(CycleReport {
            captured_at,
            hypothesis: extract.hypothesis,
            sections_found: extract.sections.len(),
            item_counts: assembly.item_counts(),
            next_updates: assembly.next_updates,
            next_run,
        })
    }
}

#[async_trait]
impl CycleRunner for StockScraper {
    async fn run_cycle(&self) -> Result<CycleReport, StockError> {
        self.scrape_once().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_page_expected_layout() {
        let html = r#"<html><body>
            <div class="grid grid-cols-1 md:grid-cols-3 gap-6 px-6 text-left max-w-screen-lg mx-auto">
                <div><h2>Seeds Stock</h2><p>UPDATES IN: 02m 00s</p>
                    <ul><li>Carrot x10</li><li>Potato</li></ul></div>
                <div><h2>Gear Stock</h2><p>UPDATES IN: 04m 10s</p>
                    <ul><li>Trowel x2</li></ul></div>
                <div><p>Advertisement</p></div>
            </div>
        </body></html>"#;

        let extract = extract_page(html, "https://example.com/stock").unwrap();
        assert_eq!(extract.hypothesis, "expected-grid");
        assert_eq!(extract.sections.len(), 2);
        assert_eq!(extract.sections[0].category, Some(Category::Seeds));
        assert_eq!(extract.sections[1].category, Some(Category::Gear));
    }

    #[test]
    fn test_extract_page_without_container() {
        let err = extract_page("<html><body><p>Maintenance</p></body></html>", "u").unwrap_err();
        assert!(matches!(err, StockError::StructureNotFound { .. }));
        assert!(!err.is_fetch_failure());
    }
}
