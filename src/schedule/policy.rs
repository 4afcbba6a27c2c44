//! Next-run delay policy

use crate::config::ScheduleConfig;
use crate::scrape::{CycleReport, MAX_DELAY_SECS, MIN_DELAY_SECS};
use crate::StockError;
use std::time::Duration;

/// Decides how long to wait before the next cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// Fixed delay after any failed cycle
    pub error_backoff: Duration,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            error_backoff: Duration::from_secs(120),
        }
    }
}

impl From<&ScheduleConfig> for SchedulePolicy {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            error_backoff: Duration::from_secs(config.error_backoff_secs),
        }
    }
}

impl SchedulePolicy {
    /// Delay after a cycle outcome
    ///
    /// A successful cycle waits for the shortest category interval it found
    /// (never below the minimum delay). A failed cycle waits the fixed backoff,
    /// whatever it computed before failing. Either way the delay is capped at
    /// [`MAX_DELAY_SECS`].
    pub fn next_delay(&self, outcome: &Result<CycleReport, StockError>) -> Duration {
        let delay = match outcome {
            Ok(report) => report.next_delay().max(Duration::from_secs(MIN_DELAY_SECS)),
            Err(_) => self.error_backoff,
        };
        delay.min(max_delay())
    }
}

/// Upper bound on any delay the scheduler arms
pub fn max_delay() -> Duration {
    Duration::from_secs(MAX_DELAY_SECS)
}
