//! Filtering and distance ordering for the drop-off list.
//!
//! Stages run in a fixed order: service type, pickup, material tags, text
//! query. Survivors are measured from the reference location, cut at the
//! radius bound and sorted nearest first. A non-empty text query bypasses the
//! radius so an explicit search always finds its matches.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::distance::{METERS_PER_MILE, haversine_meters, meters_to_miles};
use super::tags::find_tag;
use crate::models::{DropoffCategory, DropoffPoint, GeoPoint};
use crate::{RecycloseError, Result};

/// Which kind of facility the user is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Everything except donation centers
    Recycle,
    /// Donation centers only
    Donation,
    #[default]
    Any,
}

impl ServiceType {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ServiceType::Recycle => "recycle",
            ServiceType::Donation => "donation",
            ServiceType::Any => "any",
        }
    }

    #[must_use]
    pub fn accepts(self, category: DropoffCategory) -> bool {
        match self {
            ServiceType::Recycle => category != DropoffCategory::DonationCenter,
            ServiceType::Donation => category == DropoffCategory::DonationCenter,
            ServiceType::Any => true,
        }
    }
}

impl FromStr for ServiceType {
    type Err = RecycloseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "recycle" => Ok(ServiceType::Recycle),
            "donation" => Ok(ServiceType::Donation),
            "any" => Ok(ServiceType::Any),
            other => Err(RecycloseError::validation(format!(
                "unknown service type '{other}', expected recycle, donation or any"
            ))),
        }
    }
}

/// Named search radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RadiusOption {
    #[default]
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "6blocks")]
    SixBlocks,
    #[serde(rename = "1mile")]
    OneMile,
    #[serde(rename = "5miles")]
    FiveMiles,
    #[serde(rename = "40miles")]
    FortyMiles,
}

impl RadiusOption {
    pub const ALL: [RadiusOption; 5] = [
        RadiusOption::Any,
        RadiusOption::SixBlocks,
        RadiusOption::OneMile,
        RadiusOption::FiveMiles,
        RadiusOption::FortyMiles,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            RadiusOption::Any => "any",
            RadiusOption::SixBlocks => "6blocks",
            RadiusOption::OneMile => "1mile",
            RadiusOption::FiveMiles => "5miles",
            RadiusOption::FortyMiles => "40miles",
        }
    }

    /// Upper bound in miles; `Any` is unbounded
    #[must_use]
    pub fn miles(self) -> f64 {
        match self {
            RadiusOption::Any => f64::INFINITY,
            RadiusOption::SixBlocks => 0.3,
            RadiusOption::OneMile => 1.0,
            RadiusOption::FiveMiles => 5.0,
            RadiusOption::FortyMiles => 40.0,
        }
    }

    #[must_use]
    pub fn meters(self) -> f64 {
        self.miles() * METERS_PER_MILE
    }

    /// Header copy such as "within 5 mi"
    #[must_use]
    pub fn label(self) -> String {
        match self {
            RadiusOption::Any => "within any distance".to_string(),
            other => format!("within {} mi", other.miles()),
        }
    }
}

impl FromStr for RadiusOption {
    type Err = RecycloseError;

    fn from_str(s: &str) -> Result<Self> {
        RadiusOption::ALL
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| {
                RecycloseError::validation(format!(
                    "unknown radius '{s}', expected any, 6blocks, 1mile, 5miles or 40miles"
                ))
            })
    }
}

impl fmt::Display for RadiusOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Validated filter settings; build with [`FilterCriteria::builder`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    service_type: ServiceType,
    pickup_only: bool,
    categories: BTreeSet<String>,
    /// Trimmed and lowercased
    text_query: String,
    radius: RadiusOption,
}

impl FilterCriteria {
    #[must_use]
    pub fn builder() -> FilterCriteriaBuilder {
        FilterCriteriaBuilder::default()
    }

    #[must_use]
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    #[must_use]
    pub fn pickup_only(&self) -> bool {
        self.pickup_only
    }

    #[must_use]
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    #[must_use]
    pub fn text_query(&self) -> &str {
        &self.text_query
    }

    #[must_use]
    pub fn radius(&self) -> RadiusOption {
        self.radius
    }

    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.text_query.is_empty()
    }

    /// Distance bound actually applied; unbounded while searching by text
    #[must_use]
    pub fn effective_max_meters(&self) -> f64 {
        if self.has_query() {
            f64::INFINITY
        } else {
            self.radius.meters()
        }
    }

    fn matches_query(&self, point: &DropoffPoint) -> bool {
        let q = self.text_query.as_str();
        point.name.to_lowercase().contains(q)
            || point.address.to_lowercase().contains(q)
            || point.category.label().to_lowercase().contains(q)
            || point.tags.iter().any(|t| t.contains(q))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterCriteriaBuilder {
    service_type: ServiceType,
    pickup_only: bool,
    categories: Vec<String>,
    text_query: String,
    radius: RadiusOption,
}

impl FilterCriteriaBuilder {
    #[must_use]
    pub fn service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    #[must_use]
    pub fn pickup_only(mut self, pickup_only: bool) -> Self {
        self.pickup_only = pickup_only;
        self
    }

    #[must_use]
    pub fn category<S: Into<String>>(mut self, key: S) -> Self {
        self.categories.push(key.into());
        self
    }

    #[must_use]
    pub fn categories<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn text_query<S: Into<String>>(mut self, query: S) -> Self {
        self.text_query = query.into();
        self
    }

    #[must_use]
    pub fn radius(mut self, radius: RadiusOption) -> Self {
        self.radius = radius;
        self
    }

    /// Validate category keys against the filter tags
    pub fn build(self) -> Result<FilterCriteria> {
        let mut categories = BTreeSet::new();
        for key in self.categories {
            let key = key.trim().to_string();
            if key.is_empty() {
                continue;
            }
            if find_tag(&key).is_none() {
                return Err(RecycloseError::validation(format!(
                    "unknown material category '{key}'"
                )));
            }
            categories.insert(key);
        }

        Ok(FilterCriteria {
            service_type: self.service_type,
            pickup_only: self.pickup_only,
            categories,
            text_query: self.text_query.trim().to_lowercase(),
            radius: self.radius,
        })
    }
}

/// A point that survived filtering, with its distance from the reference
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropoffMatch<'a> {
    pub point: &'a DropoffPoint,
    pub distance_meters: f64,
}

impl DropoffMatch<'_> {
    #[must_use]
    pub fn distance_miles(&self) -> f64 {
        meters_to_miles(self.distance_meters)
    }
}

/// Apply `criteria` to `points` and order the survivors by distance
/// from `reference`. Equal distances keep their input order.
#[instrument(level = "debug", skip(points), fields(total = points.len()))]
pub fn filter_and_sort<'a>(
    points: &'a [DropoffPoint],
    criteria: &FilterCriteria,
    reference: GeoPoint,
) -> Result<Vec<DropoffMatch<'a>>> {
    reference.validate()?;

    let max_meters = criteria.effective_max_meters();

    let mut matches: Vec<DropoffMatch<'a>> = points
        .iter()
        .filter(|p| criteria.service_type.accepts(p.category))
        .filter(|p| !criteria.pickup_only || p.pickup)
        .filter(|p| {
            criteria.categories.is_empty() || p.tags.iter().any(|t| criteria.categories.contains(t))
        })
        .filter(|p| !criteria.has_query() || criteria.matches_query(p))
        .map(|point| DropoffMatch {
            point,
            distance_meters: haversine_meters(reference, point.location),
        })
        .filter(|m| m.distance_meters <= max_meters)
        .collect();

    matches.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));

    debug!("{} of {} points matched", matches.len(), points.len());
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dropoff::generator::generate_points;
    use crate::dropoff::tags::default_vocabulary;
    use rstest::rstest;

    const SEATTLE: GeoPoint = GeoPoint {
        longitude: -122.3321,
        latitude: 47.6062,
    };

    fn test_point(id: &str, name: &str, category: DropoffCategory, tags: &[&str], pickup: bool, lat: f64, lng: f64) -> DropoffPoint {
        DropoffPoint {
            id: id.to_string(),
            name: name.to_string(),
            category,
            address: format!("{id} Market St, Seattle"),
            hours: "9:00 AM - 4:00 PM".to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            pickup,
            phone: "(206) 555-0100".to_string(),
            url: "https://example.com".to_string(),
            rating: 4.2,
            rating_count: 12,
            location: GeoPoint {
                longitude: lng,
                latitude: lat,
            },
            hero_image: String::new(),
        }
    }

    fn fixture() -> Vec<DropoffPoint> {
        vec![
            // ~1.1 km north
            test_point("a", "Cedar Hub", DropoffCategory::RecyclingCenter, &["battery", "paper"], false, 47.6162, -122.3321),
            // ~5.6 km north
            test_point("b", "Lakeview Depot", DropoffCategory::DonationCenter, &["textile", "furniture"], true, 47.6562, -122.3321),
            // ~22 km north
            test_point("c", "Pine Station", DropoffCategory::WasteAndGarbage, &["glass", "metal"], true, 47.8062, -122.3321),
            // ~56 km south
            test_point("d", "Reclaim Battery Program", DropoffCategory::CommunityRecycling, &["battery"], false, 47.1062, -122.3321),
        ]
    }

    fn ids(matches: &[DropoffMatch<'_>]) -> Vec<String> {
        matches.iter().map(|m| m.point.id.clone()).collect()
    }

    #[test]
    fn test_default_criteria_returns_everything_sorted() {
        let points = fixture();
        let criteria = FilterCriteria::default();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert_eq!(ids(&matches), vec!["a", "b", "c", "d"]);
    }

    #[rstest]
    #[case(ServiceType::Any, vec!["a", "b", "c", "d"])]
    #[case(ServiceType::Recycle, vec!["a", "c", "d"])]
    #[case(ServiceType::Donation, vec!["b"])]
    fn test_service_type(#[case] service: ServiceType, #[case] expected: Vec<&str>) {
        let points = fixture();
        let criteria = FilterCriteria::builder().service_type(service).build().unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert_eq!(ids(&matches), expected);
    }

    #[test]
    fn test_pickup_only() {
        let points = fixture();
        let criteria = FilterCriteria::builder().pickup_only(true).build().unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert_eq!(ids(&matches), vec!["b", "c"]);
    }

    #[test]
    fn test_categories_use_or_semantics() {
        let points = fixture();
        let criteria = FilterCriteria::builder().category("battery").build().unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert_eq!(ids(&matches), vec!["a", "d"]);
        assert!(matches.iter().all(|m| m.point.has_tag("battery")));

        let criteria = FilterCriteria::builder()
            .categories(["battery", "glass"])
            .build()
            .unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert_eq!(ids(&matches), vec!["a", "c", "d"]);
    }

    #[rstest]
    #[case(RadiusOption::SixBlocks, vec![])]
    #[case(RadiusOption::OneMile, vec!["a"])]
    #[case(RadiusOption::FiveMiles, vec!["a", "b"])]
    #[case(RadiusOption::FortyMiles, vec!["a", "b", "c", "d"])]
    #[case(RadiusOption::Any, vec!["a", "b", "c", "d"])]
    fn test_radius(#[case] radius: RadiusOption, #[case] expected: Vec<&str>) {
        let points = fixture();
        let criteria = FilterCriteria::builder().radius(radius).build().unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert_eq!(ids(&matches), expected);
    }

    #[test]
    fn test_text_query_bypasses_radius() {
        let points = fixture();
        let criteria = FilterCriteria::builder()
            .radius(RadiusOption::OneMile)
            .text_query("  BATTERY ")
            .build()
            .unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        // "d" is ~56 km away but matches by name and tag
        assert_eq!(ids(&matches), vec!["a", "d"]);
    }

    #[test]
    fn test_text_query_still_honors_other_filters() {
        let points = fixture();
        let criteria = FilterCriteria::builder()
            .text_query("battery")
            .service_type(ServiceType::Recycle)
            .pickup_only(true)
            .build()
            .unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_text_query_matches_category_label_and_address() {
        let points = fixture();
        let by_label = FilterCriteria::builder().text_query("waste &").build().unwrap();
        assert_eq!(ids(&filter_and_sort(&points, &by_label, SEATTLE).unwrap()), vec!["c"]);

        let by_address = FilterCriteria::builder().text_query("b market").build().unwrap();
        assert_eq!(ids(&filter_and_sort(&points, &by_address, SEATTLE).unwrap()), vec!["b"]);
    }

    #[test]
    fn test_equal_distances_keep_input_order() {
        let points = vec![
            test_point("x", "One", DropoffCategory::RecyclingCenter, &["paper"], false, 47.61, -122.33),
            test_point("y", "Two", DropoffCategory::RecyclingCenter, &["paper"], false, 47.61, -122.33),
            test_point("z", "Three", DropoffCategory::RecyclingCenter, &["paper"], false, 47.61, -122.33),
        ];
        let matches = filter_and_sort(&points, &FilterCriteria::default(), SEATTLE).unwrap();
        assert_eq!(ids(&matches), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_generated_points_one_mile() {
        let points = generate_points(60, &default_vocabulary()).unwrap();
        let criteria = FilterCriteria::builder()
            .radius(RadiusOption::OneMile)
            .build()
            .unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert!(matches.iter().all(|m| m.distance_meters <= 1609.34));
        assert!(matches.windows(2).all(|w| w[0].distance_meters <= w[1].distance_meters));
    }

    #[test]
    fn test_generated_points_nearest_first() {
        let points = generate_points(60, &default_vocabulary()).unwrap();
        let criteria = FilterCriteria::builder()
            .radius(RadiusOption::FiveMiles)
            .build()
            .unwrap();
        let matches = filter_and_sort(&points, &criteria, SEATTLE).unwrap();
        assert_eq!(matches.len(), 7);
        assert_eq!(matches[0].point.id, "37");
        assert!(matches.windows(2).all(|w| w[0].distance_meters <= w[1].distance_meters));
    }

    #[test]
    fn test_invalid_reference_is_rejected() {
        let points = fixture();
        let bad = GeoPoint {
            longitude: 0.0,
            latitude: 123.0,
        };
        assert!(filter_and_sort(&points, &FilterCriteria::default(), bad).is_err());
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        let matches = filter_and_sort(&[], &FilterCriteria::default(), SEATTLE).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = FilterCriteria::builder().category("uranium").build().unwrap_err();
        assert!(err.to_string().contains("uranium"));
    }

    #[rstest]
    #[case("any", RadiusOption::Any, f64::INFINITY)]
    #[case("6blocks", RadiusOption::SixBlocks, 0.3)]
    #[case("1mile", RadiusOption::OneMile, 1.0)]
    #[case("5miles", RadiusOption::FiveMiles, 5.0)]
    #[case("40miles", RadiusOption::FortyMiles, 40.0)]
    fn test_radius_keys(#[case] key: &str, #[case] radius: RadiusOption, #[case] miles: f64) {
        let parsed: RadiusOption = key.parse().unwrap();
        assert_eq!(parsed, radius);
        assert_eq!(parsed.miles(), miles);
        assert_eq!(parsed.to_string(), key);
    }

    #[test]
    fn test_radius_label_and_bad_keys() {
        assert_eq!(RadiusOption::FiveMiles.label(), "within 5 mi");
        assert_eq!(RadiusOption::SixBlocks.label(), "within 0.3 mi");
        assert!("2miles".parse::<RadiusOption>().is_err());
        assert!("trash".parse::<ServiceType>().is_err());
        assert_eq!("donation".parse::<ServiceType>().unwrap(), ServiceType::Donation);
    }

    #[test]
    fn test_match_reports_miles() {
        let points = fixture();
        let matches = filter_and_sort(&points, &FilterCriteria::default(), SEATTLE).unwrap();
        let first = &matches[0];
        assert!((first.distance_miles() - first.distance_meters / 1609.34).abs() < 1e-12);
    }
}
