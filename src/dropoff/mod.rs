//! Drop-off locator
//!
//! - Seeded generation of the facility dataset
//! - Great-circle distances
//! - Filtering by service, pickup, material, text and radius
//! - Nearest-first ordering from a reference location

pub mod directory;
pub mod distance;
pub mod filter;
pub mod generator;
pub mod rng;
pub mod tags;

pub use directory::DropoffDirectory;
pub use distance::{METERS_PER_MILE, haversine_meters, meters_to_miles};
pub use filter::{
    DropoffMatch, FilterCriteria, FilterCriteriaBuilder, RadiusOption, ServiceType, filter_and_sort,
};
pub use generator::generate_points;
pub use rng::{Mulberry32, hash_str};
pub use tags::{FILTER_TAGS, FilterTag, default_vocabulary};
