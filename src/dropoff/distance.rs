//! Great-circle distances

use haversine::{Units, distance};

use crate::models::GeoPoint;

pub const METERS_PER_MILE: f64 = 1609.34;

/// Haversine distance in meters (Earth radius 6371 km)
#[must_use]
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    distance(a.into(), b.into(), Units::Kilometers) * 1000.0
}

#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint {
            longitude: lng,
            latitude: lat,
        }
    }

    #[rstest]
    #[case(point(47.0, -122.0), point(48.0, -122.0), 111_195.0)]
    #[case(point(0.0, 0.0), point(0.0, 1.0), 111_195.0)]
    #[case(point(47.6062, -122.3321), point(47.2529, -122.4443), 40_181.5)]
    fn test_reference_distances(#[case] a: GeoPoint, #[case] b: GeoPoint, #[case] expected: f64) {
        let d = haversine_meters(a, b);
        assert!(
            ((d - expected) / expected).abs() < 0.005,
            "expected ~{expected} m, got {d} m"
        );
    }

    #[test]
    fn test_zero_for_same_point() {
        let seattle = point(47.6062, -122.3321);
        assert!(haversine_meters(seattle, seattle).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric() {
        let a = point(47.6062, -122.3321);
        let b = point(47.978_984, -122.202_079);
        let ab = haversine_meters(a, b);
        let ba = haversine_meters(b, a);
        assert!((ab - ba).abs() < 1e-6);
        assert!(ab > 0.0);
    }

    #[test]
    fn test_mile_conversion() {
        assert!((meters_to_miles(miles_to_meters(5.0)) - 5.0).abs() < 1e-12);
        assert_eq!(miles_to_meters(1.0), 1609.34);
    }
}
