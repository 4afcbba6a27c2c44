//! HTTP fetcher implementation
//!
//! This module handles the single page request each cycle makes:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests to fetch the page content
//! - Error classification (timeout, transport, non-2xx)
//!
//! Failed fetches are not retried here; the scheduler retries on its next run.

use crate::config::ScraperConfig;
use crate::StockError;
use reqwest::Client;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use garden_stock::config::ScraperConfig;
/// use garden_stock::scrape::build_http_client;
///
/// let client = build_http_client(&ScraperConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the stock page
///
/// # Error Mapping
///
/// | Condition | Error |
/// |-----------|-------|
/// | Timeout (connect or body) | `StockError::Timeout` |
/// | Non-2xx status | `StockError::HttpStatus` |
/// | Any other transport failure | `StockError::Http` |
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, StockError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(StockError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> StockError {
    if error.is_timeout() {
        StockError::Timeout {
            url: url.to_string(),
        }
    } else {
        StockError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
