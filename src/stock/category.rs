//! Stock category definitions
//!
//! The tracked page groups its listings into a fixed, closed set of categories.
use serde::Serialize;
use std::fmt;

/// One of the fixed stock groupings tracked by the scraper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Seeds,
    Gear,
    EggShop,
    Honey,
    Cosmetics,
}

impl Category {
    /// All categories, in the order they are reported
    pub const ALL: [Category; 5] = [
        Self::Seeds,
        Self::Gear,
        Self::EggShop,
        Self::Honey,
        Self::Cosmetics,
    ];

    /// Label fragments checked in order against a section heading.
    ///
    /// The order matters when a heading contains more than one fragment.
    const LABEL_MATCHERS: [(&'static str, Category); 5] = [
        ("gear", Self::Gear),
        ("egg", Self::EggShop),
        ("seeds", Self::Seeds),
        ("honey", Self::Honey),
        ("cosmetics", Self::Cosmetics),
    ];

    /// Maps a free-text section heading to a category
    ///
    /// Matching is a case-insensitive substring test. Returns None when the
    /// heading names no tracked category.
    ///
    /// # Example
    ///
    /// ```
    /// use garden_stock::stock::Category;
    ///
    /// assert_eq!(Category::from_label("EGG STOCK"), Some(Category::EggShop));
    /// assert_eq!(Category::from_label("Weather"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        Self::LABEL_MATCHERS
            .iter()
            .find(|(fragment, _)| label.contains(fragment))
            .map(|(_, category)| *category)
    }

    /// Converts the category to its database/API key
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Seeds => "seeds",
            Self::Gear => "gear",
            Self::EggShop => "egg_shop",
            Self::Honey => "honey",
            Self::Cosmetics => "cosmetics",
        }
    }

    /// Parses a category from its database/API key
    ///
    /// Returns None if the string doesn't match any known category.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "seeds" => Some(Self::Seeds),
            "gear" => Some(Self::Gear),
            "egg_shop" => Some(Self::EggShop),
            "honey" => Some(Self::Honey),
            "cosmetics" => Some(Self::Cosmetics),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}
