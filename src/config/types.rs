use serde::Deserialize;

/// Default page the scraper reads stock listings from
pub const DEFAULT_TARGET_URL: &str = "https://vulcanvalues.com/grow-a-garden/stock";

/// Conventional browser user agent sent with every fetch
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main configuration structure for Garden-Stock
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the values the service runs with out of the box.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub schedule: ScheduleConfig,
    pub server: ServerConfig,
    pub output: OutputConfig,
}

/// Fetch target configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// URL of the stock listing page
    #[serde(rename = "target-url")]
    pub target_url: String,

    /// User agent header sent with the request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Rescheduling behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Delay before retrying after a failed cycle (seconds)
    #[serde(rename = "error-backoff-secs")]
    pub error_backoff_secs: u64,

    /// Whether the first scrape fires immediately at startup
    #[serde(rename = "run-on-start")]
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            error_backoff_secs: 120,
            run_on_start: true,
        }
    }
}

/// Read API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Path prefix the stock routes are nested under (may be empty)
    #[serde(rename = "api-prefix")]
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_prefix: "/api/grow-a-garden".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "stock_data.db".to_string(),
        }
    }
}
