//! Mapbox geocoding client.
//!
//! Reverse lookups turn the reference point into a short "Place, ST" label for
//! the header; forward lookups back the place search box. Transient failures
//! are retried by the middleware stack, everything else surfaces as
//! [`RecycloseError::Api`].

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use tokio::task::AbortHandle;
use tracing::{debug, instrument, warn};

use crate::config::MapConfig;
use crate::models::GeoPoint;
use crate::{RecycloseError, Result};

const UNKNOWN_PLACE: &str = "Unknown";
const MAX_CANDIDATES: usize = 5;

/// A forward-geocoding hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub location: GeoPoint,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    text: Option<String>,
    place_name: Option<String>,
    /// `[lng, lat]`
    center: Option<[f64; 2]>,
    #[serde(default)]
    context: Vec<ContextEntry>,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    #[serde(default)]
    id: String,
    short_code: Option<String>,
}

impl Feature {
    fn short_label(&self) -> String {
        let place = match self.text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => UNKNOWN_PLACE,
        };

        let region = self
            .context
            .iter()
            .find(|c| c.id.starts_with("region."))
            .and_then(|c| c.short_code.as_deref());

        match region {
            Some(code) => format!("{place}, {}", code.to_uppercase().replacen("US-", "", 1)),
            None => place.to_string(),
        }
    }

    fn into_candidate(self) -> Option<PlaceCandidate> {
        let [longitude, latitude] = self.center?;
        let location = GeoPoint::new(longitude, latitude).ok()?;
        let name = self.place_name.or(self.text)?;
        Some(PlaceCandidate { name, location })
    }
}

#[derive(Clone)]
pub struct GeocodingClient {
    client: ClientWithMiddleware,
    access_token: String,
    base_url: String,
}

impl GeocodingClient {
    /// Build from the map section of the configuration. Fails with a
    /// configuration error when no access token is set.
    pub fn new(config: &MapConfig) -> Result<Self> {
        let token = config
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| RecycloseError::config("Missing MAPBOX_TOKEN"))?;

        Self::with_base_url(
            token,
            &config.geocoding_base_url,
            Duration::from_secs(u64::from(config.timeout_seconds)),
            config.max_retries,
        )
    }

    pub fn with_base_url(
        access_token: &str,
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        if access_token.trim().is_empty() {
            return Err(RecycloseError::config("Missing MAPBOX_TOKEN"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("RecyClose/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Short "Place, ST" label for a point, or "Unknown" when nothing matches
    #[instrument(skip(self))]
    pub async fn reverse_geocode_short(&self, point: GeoPoint) -> Result<String> {
        point.validate()?;
        let url = format!(
            "{}/geocoding/v5/mapbox.places/{},{}.json?access_token={}&types=place,locality,neighborhood&limit=1",
            self.base_url,
            point.longitude,
            point.latitude,
            urlencoding::encode(&self.access_token)
        );

        let collection = self.fetch(&url).await?;
        let label = collection
            .features
            .first()
            .map_or_else(|| UNKNOWN_PLACE.to_string(), Feature::short_label);
        debug!("Reverse geocoded to {}", label);
        Ok(label)
    }

    /// Place search biased towards `proximity`
    #[instrument(skip(self))]
    pub async fn forward_geocode(
        &self,
        query: &str,
        proximity: Option<GeoPoint>,
    ) -> Result<Vec<PlaceCandidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecycloseError::validation("search query must not be empty"));
        }

        let mut url = format!(
            "{}/geocoding/v5/mapbox.places/{}.json?access_token={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.access_token),
            MAX_CANDIDATES
        );
        if let Some(p) = proximity {
            url.push_str(&format!("&proximity={},{}", p.longitude, p.latitude));
        }

        let collection = self.fetch(&url).await?;
        Ok(collection
            .features
            .into_iter()
            .filter_map(Feature::into_candidate)
            .take(MAX_CANDIDATES)
            .collect())
    }

    /// Reverse-geocoded label, or `fallback` on any failure
    pub async fn resolve_label(&self, point: GeoPoint, fallback: &str) -> String {
        match self.reverse_geocode_short(point).await {
            Ok(label) => label,
            Err(e) => {
                warn!("Reverse geocoding failed, using fallback label: {}", e);
                fallback.to_string()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<FeatureCollection> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RecycloseError::api(format!(
                "geocoding request failed with status {}",
                response.status()
            )));
        }
        Ok(response.json::<FeatureCollection>().await?)
    }
}

/// Runs lookups so that only the most recent one completes.
///
/// Starting a lookup aborts the one still in flight; the superseded caller
/// gets `None`.
#[derive(Debug, Default)]
pub struct LatestOnly {
    in_flight: Mutex<Option<AbortHandle>>,
}

impl LatestOnly {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<F, T>(&self, lookup: F) -> Option<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(lookup);
        if let Ok(mut in_flight) = self.in_flight.lock() {
            if let Some(previous) = in_flight.replace(handle.abort_handle()) {
                previous.abort();
            }
        }

        match handle.await {
            Ok(value) => Some(value),
            Err(e) if e.is_cancelled() => {
                debug!("Lookup superseded");
                None
            }
            Err(e) => {
                warn!("Lookup task failed: {}", e);
                None
            }
        }
    }
}
