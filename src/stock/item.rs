//! Stock items and the list-entry grammar
//!
//! A list entry reads `<name> x<quantity>`, e.g. `Golden Egg x12`. Entries
//! without a quantity marker name a single item.

use serde::Serialize;

/// Marker separating an item name from its quantity
const QUANTITY_MARKER: &str = " x";

/// One item listed in a category's stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockItem {
    pub name: String,
    pub stock: u32,
    /// Price is not published on the page, so it stays 0 unless known
    pub price: i64,
}

impl StockItem {
    pub fn new(name: impl Into<String>, stock: u32) -> Self {
        Self {
            name: name.into(),
            stock,
            price: 0,
        }
    }
}

/// Splits one list entry into (name, quantity)
///
/// If the text contains `" x"`, it is split on the last occurrence: the left
/// side (trimmed) is the name and the right side is the quantity, which falls
/// back to 0 when it does not parse. Without the marker the whole text is the
/// name and the quantity is 1.
///
/// # Example
///
/// ```
/// use garden_stock::stock::split_item;
///
/// assert_eq!(split_item("Golden Egg x12"), ("Golden Egg".to_string(), 12));
/// assert_eq!(split_item("Mystic Seed"), ("Mystic Seed".to_string(), 1));
/// ```
pub fn split_item(text: &str) -> (String, u32) {
    match text.rsplit_once(QUANTITY_MARKER) {
        Some((name, quantity)) => (
            name.trim().to_string(),
            quantity.trim().parse().unwrap_or(0),
        ),
        None => (text.trim().to_string(), 1),
    }
}

/// Parses one list entry into a StockItem
///
/// Returns None when the entry has no name.
pub fn parse_item(text: &str) -> Option<StockItem> {
    let (name, stock) = split_item(text);
    if name.is_empty() {
        return None;
    }
    Some(StockItem::new(name, stock))
}
