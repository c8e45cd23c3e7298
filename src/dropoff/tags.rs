//! Material tags a drop-off point can accept

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterTag {
    pub key: &'static str,
    pub label: &'static str,
}

/// Tags offered in the filter sheet, in display order
pub const FILTER_TAGS: &[FilterTag] = &[
    FilterTag { key: "paper", label: "Paper" },
    FilterTag { key: "cardboard", label: "Cardboard" },
    FilterTag { key: "plastic", label: "Plastic" },
    FilterTag { key: "metal", label: "Metal" },
    FilterTag { key: "glass", label: "Glass" },
    FilterTag { key: "battery", label: "Battery" },
    FilterTag { key: "electronics", label: "Electronics" },
    FilterTag { key: "textile", label: "Textile" },
    FilterTag { key: "furniture", label: "Furniture" },
    FilterTag { key: "tire", label: "Tire" },
    FilterTag { key: "styrofoam", label: "Styrofoam" },
    FilterTag { key: "other", label: "Other" },
];

/// Keys of [`FILTER_TAGS`], the vocabulary the directory is generated from
#[must_use]
pub fn default_vocabulary() -> Vec<String> {
    FILTER_TAGS.iter().map(|t| t.key.to_string()).collect()
}

#[must_use]
pub fn find_tag(key: &str) -> Option<&'static FilterTag> {
    FILTER_TAGS.iter().find(|t| t.key == key)
}
