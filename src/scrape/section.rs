//! Extracting one category section
//!
//! Each step is best-effort: a section missing its countdown or its list still
//! yields whatever else could be read. Only a missing heading drops the section.

use crate::scrape::duration::countdown_seconds;
use crate::scrape::locator::{parse_selector, HEADING};
use crate::stock::{parse_item, Category, StockItem};
use once_cell::sync::Lazy;
use scraper::ElementRef;
use scraper::Selector;

/// Phrase introducing a section's countdown
const COUNTDOWN_PHRASE: &str = "updates in:";

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| parse_selector("p"));
static TEXT_BEARING: Lazy<Selector> = Lazy::new(|| parse_selector("p, div, span"));
static LIST: Lazy<Selector> = Lazy::new(|| parse_selector("ul"));
static LIST_ENTRY: Lazy<Selector> = Lazy::new(|| parse_selector("li"));

/// Everything read from one category section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionExtract {
    /// Trimmed heading text
    pub label: String,
    /// Category the heading maps to, if any
    pub category: Option<Category>,
    /// Trimmed, non-empty text of each list entry
    pub item_texts: Vec<String>,
    /// Whether the section contained a list at all
    pub has_list: bool,
    /// Full text of the element holding the countdown, or empty
    pub countdown_text: String,
}

impl SectionExtract {
    /// Parses the list entries into stock items, dropping nameless entries
    pub fn items(&self) -> Vec<StockItem> {
        self.item_texts.iter().filter_map(|t| parse_item(t)).collect()
    }

    /// Seconds until this section's listing changes
    pub fn next_update_secs(&self) -> u64 {
        countdown_seconds(&self.countdown_text)
    }
}

/// A way of finding the countdown element within a section
type CountdownStrategy = fn(ElementRef<'_>) -> Option<String>;

/// Countdown lookups in the order they are tried
const COUNTDOWN_CASCADE: &[(&str, CountdownStrategy)] = &[
    ("paragraph-own-text", countdown_in_paragraph),
    ("any-descendant-text", countdown_in_descendants),
];

/// Extracts label, list entries and countdown text from a section
///
/// Returns None when the section has no heading or the heading is blank.
pub fn extract_section(section: ElementRef<'_>) -> Option<SectionExtract> {
    let heading = section.select(&HEADING).next()?;
    let label = normalize_text(heading);
    if label.is_empty() {
        return None;
    }

    let countdown_text = find_countdown_text(section).unwrap_or_default();

    let list = section.select(&LIST).next();
    let item_texts = list
        .map(|ul| {
            ul.select(&LIST_ENTRY)
                .map(normalize_text)
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Some(SectionExtract {
        category: Category::from_label(&label),
        label,
        item_texts,
        has_list: list.is_some(),
        countdown_text,
    })
}

/// Finds the text of the element carrying the countdown
pub fn find_countdown_text(section: ElementRef<'_>) -> Option<String> {
    COUNTDOWN_CASCADE.iter().find_map(|(name, strategy)| {
        let text = strategy(section)?;
        tracing::trace!("Countdown found by '{}': {}", name, text);
        Some(text)
    })
}

/// A paragraph whose own text nodes hold the phrase
fn countdown_in_paragraph(section: ElementRef<'_>) -> Option<String> {
    section
        .select(&PARAGRAPH)
        .find(|p| {
            let own_text: String = p
                .children()
                .filter_map(|child| child.value().as_text())
                .map(|text| &**text)
                .collect();
            contains_phrase(&own_text)
        })
        .map(normalize_text)
}

/// Any text-bearing descendant whose full text holds the phrase
fn countdown_in_descendants(section: ElementRef<'_>) -> Option<String> {
    section
        .select(&TEXT_BEARING)
        .map(normalize_text)
        .find(|text| contains_phrase(text))
}

fn contains_phrase(text: &str) -> bool {
    text.to_lowercase().contains(COUNTDOWN_PHRASE)
}

/// Collects an element's text with whitespace runs collapsed and trimmed
fn normalize_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
