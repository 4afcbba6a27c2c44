//! Scrape module for reading stock from the listing page
//!
//! This module contains the scrape pipeline, including:
//! - HTTP fetching of the listing page
//! - Locating the stock container through a cascade of structural guesses
//! - Per-section extraction of labels, list entries and countdown text
//! - Countdown parsing into whole seconds
//! - Assembling per-category snapshots and choosing the next run delay

mod assembler;
mod duration;
mod fetcher;
mod locator;
mod pipeline;
mod section;

pub use assembler::{Assembly, NextRun, NextUpdateMap};
pub use duration::{
    countdown_remainder, countdown_seconds, parse_update_time, DEFAULT_DELAY_SECS,
    MAX_DELAY_SECS, MIN_DELAY_SECS,
};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use locator::{
    find_sections, locate_container, ContainerHypothesis, LocatedContainer, CONTAINER_CASCADE,
};
pub use pipeline::{extract_page, CycleReport, PageExtract, StockScraper};
pub use section::{extract_section, find_countdown_text, SectionExtract};
