//! Stock domain model
//!
//! # Components
//!
//! - `Category`: The closed set of tracked stock groupings and label matching
//! - `StockItem`: One listed item, plus the list-entry grammar that produces it
//! - `CategorySnapshot` / `StockSnapshot`: Stored stock as read back for the API

mod category;
mod item;
mod snapshot;

pub use category::Category;
pub use item::{parse_item, split_item, StockItem};
pub use snapshot::{CategorySnapshot, StockSnapshot};
