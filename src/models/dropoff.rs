//! Drop-off facility records

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Kind of facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropoffCategory {
    #[serde(rename = "Recycling Center")]
    RecyclingCenter,
    #[serde(rename = "Donation Center")]
    DonationCenter,
    #[serde(rename = "Waste & Garbage")]
    WasteAndGarbage,
    #[serde(rename = "Community Recycling")]
    CommunityRecycling,
}

impl DropoffCategory {
    /// Generation order; index draws select from this table
    pub const ALL: [DropoffCategory; 4] = [
        DropoffCategory::RecyclingCenter,
        DropoffCategory::DonationCenter,
        DropoffCategory::WasteAndGarbage,
        DropoffCategory::CommunityRecycling,
    ];

    /// Display label, also used by text search
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DropoffCategory::RecyclingCenter => "Recycling Center",
            DropoffCategory::DonationCenter => "Donation Center",
            DropoffCategory::WasteAndGarbage => "Waste & Garbage",
            DropoffCategory::CommunityRecycling => "Community Recycling",
        }
    }
}

impl fmt::Display for DropoffCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One drop-off facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropoffPoint {
    pub id: String,
    pub name: String,
    pub category: DropoffCategory,
    pub address: String,
    pub hours: String,
    /// Tag keys in insertion order, no duplicates
    pub tags: Vec<String>,
    pub pickup: bool,
    pub phone: String,
    pub url: String,
    /// 3.6..=4.9, one decimal
    pub rating: f64,
    pub rating_count: u32,
    pub location: GeoPoint,
    pub hero_image: String,
}

impl DropoffPoint {
    #[must_use]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|t| t == key)
    }

    /// "4.7 (160)"
    #[must_use]
    pub fn format_rating(&self) -> String {
        format!("{:.1} ({})", self.rating, self.rating_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&DropoffCategory::WasteAndGarbage).unwrap();
        assert_eq!(json, "\"Waste & Garbage\"");
        for category in DropoffCategory::ALL {
            assert_eq!(category.to_string(), category.label());
        }
    }
}
