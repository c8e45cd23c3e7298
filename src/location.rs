//! Reference location for distance sorting.
//!
//! The search base starts at the configured center and moves when the device
//! reports a position. A failed lookup leaves the base where it was and
//! reports why.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::Result;
use crate::config::RecycloseConfig;
use crate::models::GeoPoint;

/// Label used after a successful device lookup until reverse geocoding
/// produces something better
pub const CURRENT_LOCATION_LABEL: &str = "Current location";
/// Label used when the user picks a point on the map
pub const SELECTED_AREA_LABEL: &str = "Selected area";

/// Result of a one-shot device position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeolocationOutcome {
    Located(GeoPoint),
    Denied,
    TimedOut,
    Unsupported,
}

/// Source of device positions (browser geolocation, GPS, a fixed fake)
#[allow(async_fn_in_trait)]
pub trait GeolocationProvider {
    async fn current_position(&self) -> GeolocationOutcome;
}

/// What the last locate attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    Idle,
    Located,
    Denied,
    TimedOut,
    Unsupported,
}

impl LocationStatus {
    /// Short message for the location chip, `None` when nothing to report
    #[must_use]
    pub fn message(self) -> Option<&'static str> {
        match self {
            LocationStatus::Idle | LocationStatus::Located => None,
            LocationStatus::Denied => Some("Location denied"),
            LocationStatus::TimedOut => Some("Locating timed out"),
            LocationStatus::Unsupported => Some("Geolocation unsupported"),
        }
    }
}

impl fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => f.write_str(message),
            None => f.write_str("ok"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLocation {
    point: GeoPoint,
    label: String,
    status: LocationStatus,
}

impl ReferenceLocation {
    pub fn new<S: Into<String>>(point: GeoPoint, label: S) -> Result<Self> {
        point.validate()?;
        Ok(Self {
            point,
            label: label.into(),
            status: LocationStatus::Idle,
        })
    }

    /// Configured default center and its label
    pub fn from_config(config: &RecycloseConfig) -> Result<Self> {
        Self::new(config.default_center()?, config.dropoff.center_label.clone())
    }

    #[must_use]
    pub fn point(&self) -> GeoPoint {
        self.point
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn status(&self) -> LocationStatus {
        self.status
    }

    /// Move the base to a point chosen on the map
    pub fn select(&mut self, point: GeoPoint) -> Result<()> {
        point.validate()?;
        self.point = point;
        self.label = SELECTED_AREA_LABEL.to_string();
        self.status = LocationStatus::Idle;
        Ok(())
    }

    /// Ask the provider for the device position once and apply the outcome
    pub async fn locate<P: GeolocationProvider>(&mut self, provider: &P) -> LocationStatus {
        let outcome = provider.current_position().await;
        self.apply_geolocation(outcome)
    }

    /// Apply a geolocation outcome. Only a valid `Located` moves the base.
    pub fn apply_geolocation(&mut self, outcome: GeolocationOutcome) -> LocationStatus {
        self.status = match outcome {
            GeolocationOutcome::Located(point) if point.validate().is_ok() => {
                info!("Reference moved to {}", point.format_coordinates());
                self.point = point;
                self.label = CURRENT_LOCATION_LABEL.to_string();
                LocationStatus::Located
            }
            // A provider reporting garbage coordinates is as good as no provider
            GeolocationOutcome::Located(_) | GeolocationOutcome::Unsupported => {
                LocationStatus::Unsupported
            }
            GeolocationOutcome::Denied => LocationStatus::Denied,
            GeolocationOutcome::TimedOut => LocationStatus::TimedOut,
        };
        debug!(status = ?self.status, "Applied geolocation outcome");
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(GeolocationOutcome);

    impl GeolocationProvider for FixedProvider {
        async fn current_position(&self) -> GeolocationOutcome {
            self.0
        }
    }

    fn seattle() -> ReferenceLocation {
        ReferenceLocation::from_config(&RecycloseConfig::default()).unwrap()
    }

    #[test]
    fn test_default_is_configured_center() {
        let reference = seattle();
        assert_eq!(reference.label(), "Seattle, WA");
        assert_eq!(reference.point(), GeoPoint::new(-122.3321, 47.6062).unwrap());
        assert_eq!(reference.status(), LocationStatus::Idle);
    }

    #[tokio::test]
    async fn test_located_moves_base() {
        let tacoma = GeoPoint::new(-122.4443, 47.2529).unwrap();
        let mut reference = seattle();

        let status = reference.locate(&FixedProvider(GeolocationOutcome::Located(tacoma))).await;
        assert_eq!(status, LocationStatus::Located);
        assert_eq!(reference.point(), tacoma);
        assert_eq!(reference.label(), CURRENT_LOCATION_LABEL);
        assert_eq!(status.message(), None);
    }

    #[tokio::test]
    async fn test_failures_keep_base_with_distinct_status() {
        let cases = [
            (GeolocationOutcome::Denied, "Location denied"),
            (GeolocationOutcome::TimedOut, "Locating timed out"),
            (GeolocationOutcome::Unsupported, "Geolocation unsupported"),
        ];
        for (outcome, message) in cases {
            let mut reference = seattle();
            let before = reference.point();
            let status = reference.locate(&FixedProvider(outcome)).await;
            assert_eq!(status.message(), Some(message));
            assert_eq!(reference.point(), before);
            assert_eq!(reference.label(), "Seattle, WA");
        }
    }

    #[test]
    fn test_invalid_located_point_is_ignored() {
        let mut reference = seattle();
        let bogus = GeoPoint {
            longitude: 200.0,
            latitude: 0.0,
        };
        let status = reference.apply_geolocation(GeolocationOutcome::Located(bogus));
        assert_eq!(status, LocationStatus::Unsupported);
        assert_eq!(reference.label(), "Seattle, WA");
    }

    #[test]
    fn test_select_uses_selected_area_label() {
        let mut reference = seattle();
        let point = GeoPoint::new(-122.2, 47.7).unwrap();
        reference.select(point).unwrap();
        assert_eq!(reference.label(), SELECTED_AREA_LABEL);
        assert_eq!(reference.point(), point);
        assert!(reference.select(GeoPoint { longitude: 0.0, latitude: 91.0 }).is_err());
    }
}
