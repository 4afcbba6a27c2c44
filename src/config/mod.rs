//! Configuration module for Garden-Stock
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; an absent file means the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use garden_stock::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("garden-stock.toml")).unwrap();
//! println!("Retrying failed scrapes after {}s", config.schedule.error_backoff_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, ScheduleConfig, ScraperConfig, ServerConfig, DEFAULT_TARGET_URL,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
