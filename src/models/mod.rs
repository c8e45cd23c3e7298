//! Data models for the RecyClose application
//!
//! - Location: geographic coordinates
//! - Dropoff: facility records shown on the map and in the list

pub mod dropoff;
pub mod location;

pub use dropoff::{DropoffCategory, DropoffPoint};
pub use location::GeoPoint;
