//! Recycling knowledge base.
//!
//! Categories and item articles are compiled into the binary and parsed once
//! on first access.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Material category of the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKey {
    Glass,
    Plastic,
    Paper,
    Metal,
    Electronics,
    Organic,
    Hazardous,
}

impl CategoryKey {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            CategoryKey::Glass => "glass",
            CategoryKey::Plastic => "plastic",
            CategoryKey::Paper => "paper",
            CategoryKey::Metal => "metal",
            CategoryKey::Electronics => "electronics",
            CategoryKey::Organic => "organic",
            CategoryKey::Hazardous => "hazardous",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub key: CategoryKey,
    pub title: String,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

/// One knowledge-base article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub slug: String,
    pub name: String,
    pub category: CategoryKey,
    pub image: String,
    pub example_photos: Vec<String>,
    pub intro: String,
    pub sections: Vec<Section>,
}

impl Item {
    /// Locator link searching for this item by name
    #[must_use]
    pub fn dropoff_link(&self) -> String {
        format!("/dropoff?q={}", urlencoding::encode(&self.name))
    }
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    categories: Vec<Category>,
    items: Vec<Item>,
}

static CATALOG: LazyLock<CatalogData> = LazyLock::new(|| {
    serde_json::from_str(include_str!("catalog.json")).expect("bundled catalog.json is valid")
});

/// All categories in display order
#[must_use]
pub fn categories() -> &'static [Category] {
    &CATALOG.categories
}

#[must_use]
pub fn category(key: &str) -> Option<&'static Category> {
    CATALOG.categories.iter().find(|c| c.key.key() == key)
}

#[must_use]
pub fn is_category_key(key: &str) -> bool {
    category(key).is_some()
}

/// All items in catalog order
#[must_use]
pub fn items() -> &'static [Item] {
    &CATALOG.items
}

#[must_use]
pub fn item(slug: &str) -> Option<&'static Item> {
    CATALOG.items.iter().find(|i| i.slug == slug)
}

#[must_use]
pub fn items_in_category(key: CategoryKey) -> Vec<&'static Item> {
    CATALOG.items.iter().filter(|i| i.category == key).collect()
}

/// Items whose name contains `query` (case-insensitive), grouped by
/// category in catalog order. Categories with no hits are kept, empty.
#[must_use]
pub fn search(query: &str) -> Vec<(&'static Category, Vec<&'static Item>)> {
    let q = query.trim().to_lowercase();
    CATALOG
        .categories
        .iter()
        .map(|c| {
            let hits = CATALOG
                .items
                .iter()
                .filter(|i| i.category == c.key)
                .filter(|i| q.is_empty() || i.name.to_lowercase().contains(&q))
                .collect();
            (c, hits)
        })
        .collect()
}

/// Resolve saved slugs to items, keeping the given order and skipping
/// slugs that are not in the catalog
#[must_use]
pub fn items_by_slugs<S: AsRef<str>>(slugs: &[S]) -> Vec<&'static Item> {
    slugs.iter().filter_map(|s| item(s.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_parses() {
        assert_eq!(categories().len(), 7);
        assert_eq!(items().len(), 42);
        assert_eq!(categories()[0].key, CategoryKey::Glass);
    }

    #[test]
    fn test_slugs_are_unique() {
        let slugs: HashSet<&str> = items().iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs.len(), items().len());
    }

    #[test]
    fn test_every_category_has_six_items() {
        for c in categories() {
            assert_eq!(items_in_category(c.key).len(), 6, "category {}", c.title);
        }
    }

    #[test]
    fn test_lookup() {
        let jar = item("glass-jar").unwrap();
        assert_eq!(jar.name, "Jar");
        assert_eq!(jar.category, CategoryKey::Glass);
        assert_eq!(jar.example_photos.len(), 3);
        assert!(item("nope").is_none());

        assert!(is_category_key("hazardous"));
        assert!(!is_category_key("Hazardous"));
        assert_eq!(category("metal").map(|c| c.title.as_str()), Some("Metal"));
    }

    #[test]
    fn test_search_is_case_insensitive_and_grouped() {
        let results = search("  BOTTLE ");
        assert_eq!(results.len(), 7);
        let total: usize = results.iter().map(|(_, hits)| hits.len()).sum();
        assert!(total >= 2);
        for (category, hits) in &results {
            for hit in hits {
                assert_eq!(hit.category, category.key);
                assert!(hit.name.to_lowercase().contains("bottle"));
            }
        }
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let total: usize = search("").iter().map(|(_, hits)| hits.len()).sum();
        assert_eq!(total, items().len());
    }

    #[test]
    fn test_items_by_slugs_keeps_order_and_skips_unknown() {
        let found = items_by_slugs(&["haz-paint", "missing", "glass-jar"]);
        let slugs: Vec<&str> = found.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["haz-paint", "glass-jar"]);
    }

    #[test]
    fn test_dropoff_links_search_by_item_name() {
        assert_eq!(item("glass-jar").unwrap().dropoff_link(), "/dropoff?q=Jar");
        assert_eq!(
            item("haz-paint").unwrap().dropoff_link(),
            "/dropoff?q=Paint%20%26%20Solvents"
        );
    }
}
