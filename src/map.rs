//! Map provider seam.
//!
//! Rendering belongs to an external map library. This module decides whether
//! the map can be shown at all and keeps the renderer's markers and camera in
//! step with the drop-off directory.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RecycloseConfig;
use crate::models::{DropoffPoint, GeoPoint};

/// Zoom used when the map first opens
pub const INITIAL_ZOOM: f64 = 11.0;
/// Minimum zoom when the camera focuses a single point
pub const FOCUS_ZOOM: f64 = 12.0;

const REMEDIATION: &[&str] = &[
    "Set MAPBOX_TOKEN or map.access_token in the config file",
    "Enable hardware acceleration in browser settings",
    "Disable extensions that block WebGL",
];

/// Whether the map can be rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MapAvailability {
    Ready {
        access_token: String,
        style_url: String,
        center: GeoPoint,
        zoom: f64,
    },
    Unavailable {
        reason: String,
        remediation: Vec<String>,
    },
}

impl MapAvailability {
    /// Resolve from configuration. A missing token degrades to
    /// `Unavailable` instead of failing.
    #[must_use]
    pub fn from_config(config: &RecycloseConfig) -> Self {
        let center = match config.default_center() {
            Ok(center) => center,
            Err(e) => return Self::unavailable(format!("Invalid default center: {e}")),
        };

        match config.map.access_token.as_deref() {
            Some(token) if !token.trim().is_empty() => MapAvailability::Ready {
                access_token: token.to_string(),
                style_url: config.map.style_url.clone(),
                center,
                zoom: INITIAL_ZOOM,
            },
            _ => {
                warn!("No map access token configured, map will be unavailable");
                Self::unavailable("Missing MAPBOX_TOKEN")
            }
        }
    }

    #[must_use]
    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        MapAvailability::Unavailable {
            reason: reason.into(),
            remediation: REMEDIATION.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, MapAvailability::Ready { .. })
    }
}

/// Commands understood by the external map renderer
pub trait MapSurface {
    fn add_marker(&mut self, id: &str, at: GeoPoint);
    fn remove_marker(&mut self, id: &str);
    fn set_marker_active(&mut self, id: &str, active: bool);
    fn ease_to(&mut self, center: GeoPoint, zoom: f64);
    fn zoom(&self) -> f64;
}

/// Events reported back by the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    MarkerClicked(String),
    MapClicked,
}

/// Tracks which markers are on the surface and which one is selected
#[derive(Debug, Default)]
pub struct MarkerLayer {
    marker_ids: Vec<String>,
    active: Option<String>,
}

impl MarkerLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every marker with one per point
    pub fn sync<S: MapSurface>(&mut self, surface: &mut S, points: &[DropoffPoint]) {
        for id in self.marker_ids.drain(..) {
            surface.remove_marker(&id);
        }
        for point in points {
            surface.add_marker(&point.id, point.location);
            self.marker_ids.push(point.id.clone());
        }
        self.active = None;
        debug!("Synced {} markers", self.marker_ids.len());
    }

    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// React to a renderer event. Returns the newly selected point, if any.
    pub fn handle_event<'p, S: MapSurface>(
        &mut self,
        surface: &mut S,
        points: &'p [DropoffPoint],
        event: &MapEvent,
    ) -> Option<&'p DropoffPoint> {
        match event {
            MapEvent::MapClicked => {
                self.set_active(surface, None);
                None
            }
            MapEvent::MarkerClicked(id) => {
                let point = points.iter().find(|p| &p.id == id)?;
                self.set_active(surface, Some(id.clone()));
                let zoom = surface.zoom().max(FOCUS_ZOOM);
                surface.ease_to(point.location, zoom);
                Some(point)
            }
        }
    }

    fn set_active<S: MapSurface>(&mut self, surface: &mut S, next: Option<String>) {
        if let Some(previous) = self.active.take() {
            surface.set_marker_active(&previous, false);
        }
        if let Some(id) = &next {
            surface.set_marker_active(id, true);
        }
        self.active = next;
    }
}
