//! `RecyClose` - find where to recycle, donate or dispose of things nearby
//!
//! This library provides the drop-off locator (seeded facility data,
//! distance filtering and sorting), the recycling knowledge base, saved-item
//! bookmarks and the map and geocoding collaborators behind the web app.

pub mod api;
pub mod catalog;
pub mod config;
pub mod dropoff;
pub mod error;
pub mod geocoding;
pub mod location;
pub mod map;
pub mod models;
pub mod saved;
pub mod web;

// Re-export core types for public API
pub use config::RecycloseConfig;
pub use dropoff::{DropoffDirectory, FilterCriteria, RadiusOption, ServiceType, filter_and_sort};
pub use error::RecycloseError;
pub use geocoding::{GeocodingClient, LatestOnly, PlaceCandidate};
pub use location::{GeolocationOutcome, GeolocationProvider, LocationStatus, ReferenceLocation};
pub use map::{MapAvailability, MapEvent, MapSurface, MarkerLayer};
pub use models::{DropoffCategory, DropoffPoint, GeoPoint};
pub use saved::SavedStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RecycloseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
