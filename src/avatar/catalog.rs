/// Fixed default images per avatar category
use crate::avatar::AvatarCategory;
use std::collections::BTreeMap;

/// Background used when a category has no catalog entry
pub const FALLBACK_PLACEHOLDER_COLOR: &str = "#333";

/// Default images and placeholder colour for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Primary default, a local path or remote URL
    pub primary: String,
    /// Remote backup tried when the primary fails to load
    pub secondary: String,
    pub placeholder_color: String,
}

impl CatalogEntry {
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        placeholder_color: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            placeholder_color: placeholder_color.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AvatarCatalog {
    entries: BTreeMap<AvatarCategory, CatalogEntry>,
}

impl AvatarCatalog {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, category: AvatarCategory, entry: CatalogEntry) -> Self {
        self.entries.insert(category, entry);
        self
    }

    pub fn entry(&self, category: AvatarCategory) -> Option<&CatalogEntry> {
        self.entries.get(&category)
    }

    pub fn placeholder_color(&self, category: AvatarCategory) -> &str {
        self.entry(category)
            .map(|e| e.placeholder_color.as_str())
            .unwrap_or(FALLBACK_PLACEHOLDER_COLOR)
    }
}

impl Default for AvatarCatalog {
    fn default() -> Self {
        Self::empty()
            .with_entry(
                AvatarCategory::Sloth,
                CatalogEntry::new(
                    "images/sloth.jpg",
                    "https://upload.wikimedia.org/wikipedia/commons/1/18/Two-toed_sloth_Costa_Rica_-_cropped.jpg",
                    "#8B7355",
                ),
            )
            .with_entry(
                AvatarCategory::Lion,
                CatalogEntry::new(
                    "https://upload.wikimedia.org/wikipedia/commons/7/73/Lion_waiting_in_Namibia.jpg",
                    "https://upload.wikimedia.org/wikipedia/commons/7/7a/Lion_d%27Afrique.jpg",
                    "#DAA520",
                ),
            )
            .with_entry(
                AvatarCategory::Alligator,
                CatalogEntry::new(
                    "images/alligator.jpg",
                    "https://upload.wikimedia.org/wikipedia/commons/1/17/American_Alligator.jpg",
                    "#556B2F",
                ),
            )
            .with_entry(
                AvatarCategory::Skunk,
                CatalogEntry::new(
                    "images/skunk.jpg",
                    "https://upload.wikimedia.org/wikipedia/commons/6/63/Striped_Skunk.jpg",
                    "#2F4F4F",
                ),
            )
            .with_entry(
                AvatarCategory::Wolf,
                CatalogEntry::new(
                    "https://upload.wikimedia.org/wikipedia/commons/6/68/Eurasian_wolf_2.jpg",
                    "https://upload.wikimedia.org/wikipedia/commons/d/d9/Canis_lupus_laying.jpg",
                    "#696969",
                ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_every_category() {
        let catalog = AvatarCatalog::default();
        for category in AvatarCategory::ALL {
            assert!(catalog.entry(category).is_some(), "missing {}", category);
        }
        assert_eq!(catalog.placeholder_color(AvatarCategory::Sloth), "#8B7355");
    }

    #[test]
    fn test_empty_catalog_uses_fallback_color() {
        let catalog = AvatarCatalog::empty();
        assert_eq!(catalog.placeholder_color(AvatarCategory::Lion), "#333");
    }
}
