//! Countdown text parsing
//!
//! Turns strings like `"1h 13m 56s"` or `"03m 56s"` into whole seconds.

use once_cell::sync::Lazy;
use regex::Regex;
use std::num::IntErrorKind;

/// Delay used when no countdown can be read (seconds)
pub const DEFAULT_DELAY_SECS: u64 = 300;

/// Smallest delay a parsed countdown can produce (seconds)
pub const MIN_DELAY_SECS: u64 = 30;

/// Longest delay the scheduler will wait between cycles (seconds)
pub const MAX_DELAY_SECS: u64 = 24 * 60 * 60;

/// Optional hour, minute and second groups, in that order
static HMS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(\d+)h\s*)?(?:(\d+)m\s*)?(?:(\d+)s)?").expect("valid countdown pattern")
});

/// Captures whatever follows the "updates in:" phrase on its line
static UPDATES_IN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)updates in:\s*(.+)").expect("valid updates-in pattern"));

/// Parses countdown text into seconds
///
/// The first run of `<digits>h`, `<digits>m`, `<digits>s` groups is used;
/// absent groups count as zero. Text without any group yields
/// [`DEFAULT_DELAY_SECS`]; anything else is floored at [`MIN_DELAY_SECS`].
/// Values too large to represent saturate at `u64::MAX`. This never fails.
///
/// # Example
///
/// ```
/// use garden_stock::scrape::parse_update_time;
///
/// assert_eq!(parse_update_time("1h 13m 56s"), 4436);
/// assert_eq!(parse_update_time("45s"), 45);
/// assert_eq!(parse_update_time(""), 300);
/// assert_eq!(parse_update_time("0s"), 30);
/// ```
pub fn parse_update_time(text: &str) -> u64 {
    let text = text.trim();

    let groups = HMS_PATTERN
        .captures_iter(text)
        .find(|caps| (1..=3).any(|i| caps.get(i).is_some()));

    let Some(caps) = groups else {
        return DEFAULT_DELAY_SECS;
    };

    let group = |i: usize| -> u64 {
        caps.get(i).map(|m| parse_digits(m.as_str())).unwrap_or(0)
    };

    let total = group(1)
        .saturating_mul(3600)
        .saturating_add(group(2).saturating_mul(60))
        .saturating_add(group(3));

    total.max(MIN_DELAY_SECS)
}

/// Parses a digit run, saturating instead of overflowing
///
/// `\d` also matches non-ASCII digits, which read as zero.
fn parse_digits(digits: &str) -> u64 {
    match digits.parse::<u64>() {
        Ok(value) => value,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => u64::MAX,
        Err(_) => 0,
    }
}

/// Extracts the countdown portion from text containing "updates in:"
///
/// Returns None when the phrase is missing or nothing follows it.
pub fn countdown_remainder(text: &str) -> Option<&str> {
    UPDATES_IN_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Reads the delay encoded in a section's countdown text
///
/// Empty or unreadable countdown text yields [`DEFAULT_DELAY_SECS`].
pub fn countdown_seconds(countdown_text: &str) -> u64 {
    countdown_remainder(countdown_text)
        .map(parse_update_time)
        .unwrap_or(DEFAULT_DELAY_SECS)
}
