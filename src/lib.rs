//! Garden-Stock: an adaptive stock-page scraper
//!
//! This crate periodically scrapes a third-party stock listing page, extracts
//! per-category item lists from markup whose shape is not guaranteed, persists
//! each category as a replaceable snapshot, and reschedules itself based on the
//! countdown text embedded in the page.

pub mod config;
pub mod schedule;
pub mod scrape;
pub mod server;
pub mod stock;
pub mod storage;

use thiserror::Error;

/// Main error type for Garden-Stock operations
#[derive(Debug, Error)]
pub enum StockError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Stock container not found in page from {url}")]
    StructureNotFound { url: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl StockError {
    /// Returns true if the error came from fetching the page (timeout, transport, non-2xx)
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Garden-Stock operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use schedule::{AdaptiveScheduler, SchedulePolicy, SchedulerState};
pub use scrape::{CycleReport, StockScraper};
pub use stock::{Category, CategorySnapshot, StockItem, StockSnapshot};
