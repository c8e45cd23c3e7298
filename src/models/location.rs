//! Geographic coordinate model

use serde::{Deserialize, Serialize};

use crate::{RecycloseError, Result};

/// A longitude/latitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in decimal degrees, -180..=180
    pub longitude: f64,
    /// Latitude in decimal degrees, -90..=90
    pub latitude: f64,
}

impl GeoPoint {
    /// Create a validated point
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        let point = Self {
            longitude,
            latitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Check the coordinate ranges
    pub fn validate(&self) -> Result<()> {
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(RecycloseError::validation(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(RecycloseError::validation(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        Ok(())
    }

    /// Format as "lat, lng" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl From<GeoPoint> for haversine::Location {
    fn from(point: GeoPoint) -> Self {
        haversine::Location {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_point() {
        let point = GeoPoint::new(-122.3321, 47.6062).unwrap();
        assert_eq!(point.format_coordinates(), "47.6062, -122.3321");
    }

    #[test]
    fn test_out_of_range_point() {
        assert!(GeoPoint::new(-181.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 90.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(180.0, -90.0).is_ok());
    }
}
