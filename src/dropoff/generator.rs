//! Deterministic drop-off point generation.
//!
//! Every point is derived from its index alone: the index is hashed into a
//! seed, and a fresh [`Mulberry32`] is drawn from in a fixed order. Reordering
//! the draws below changes the whole dataset.

use std::collections::HashSet;

use tracing::debug;

use super::rng::Mulberry32;
use crate::models::{DropoffCategory, DropoffPoint, GeoPoint};
use crate::{RecycloseError, Result};

const LONGITUDE_SPAN: f64 = 0.5;
const LATITUDE_SPAN: f64 = 0.36;
const MIN_TAGS: usize = 2;
const TAG_COUNT_CHOICES: usize = 4;

#[derive(Debug, Clone, Copy)]
struct CitySeed {
    city: &'static str,
    lat: f64,
    lng: f64,
}

const CITY_SEEDS: &[CitySeed] = &[
    CitySeed { city: "Seattle", lat: 47.6062, lng: -122.3321 },
    CitySeed { city: "Bellevue", lat: 47.6101, lng: -122.2015 },
    CitySeed { city: "Redmond", lat: 47.67399, lng: -122.1215 },
    CitySeed { city: "Kirkland", lat: 47.6769, lng: -122.2060 },
    CitySeed { city: "Renton", lat: 47.4829, lng: -122.2171 },
    CitySeed { city: "Issaquah", lat: 47.5301, lng: -122.0326 },
    CitySeed { city: "Sammamish", lat: 47.6163, lng: -122.0356 },
    CitySeed { city: "Bothell", lat: 47.7623, lng: -122.2054 },
    CitySeed { city: "Lynnwood", lat: 47.8209, lng: -122.3151 },
    CitySeed { city: "Shoreline", lat: 47.7557, lng: -122.3415 },
    CitySeed { city: "Everett", lat: 47.978984, lng: -122.202079 },
    CitySeed { city: "Tacoma", lat: 47.2529, lng: -122.4443 },
];

const NAMES_A: &[&str] = &[
    "GreenCycle",
    "Renew",
    "Cascade",
    "North Loop",
    "Blue Planet",
    "EcoWise",
    "Reclaim",
    "Cedar",
    "Pine",
    "Lakeview",
];

const NAMES_B: &[&str] = &["Hub", "Center", "Station", "Dropoff", "Facility", "Depot", "Program"];

const STREETS: &[&str] = &["Cedar", "Pine", "Lake", "Union", "Market", "Rainier", "Aurora"];

const HOURS: &[&str] = &[
    "8:00 AM - 5:00 PM",
    "7:30 AM - 3:30 PM",
    "10:00 AM - 6:00 PM",
    "9:00 AM - 4:00 PM",
];

pub const HERO_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1523413651479-597eb2da0ad6?auto=format&fit=crop&w=1400&q=80",
    "https://images.unsplash.com/photo-1485230405346-71acb9518d9c?auto=format&fit=crop&w=1400&q=80",
    "https://images.unsplash.com/photo-1560743641-3914f2c45636?auto=format&fit=crop&w=1400&q=80",
    "https://images.unsplash.com/photo-1520975958225-1ecf4d798c3a?auto=format&fit=crop&w=1400&q=80",
];

const PLACEHOLDER_URL: &str = "https://example.com";
const PICKUP_PROBABILITY: f64 = 0.35;

/// Generate `count` points whose tags come from `vocabulary`.
///
/// Pure function of its arguments. Fails when the vocabulary is empty,
/// since there would be nothing to draw tags from.
pub fn generate_points(count: usize, vocabulary: &[String]) -> Result<Vec<DropoffPoint>> {
    if vocabulary.is_empty() {
        return Err(RecycloseError::validation(
            "tag vocabulary must contain at least one tag",
        ));
    }

    let distinct = vocabulary.iter().collect::<HashSet<_>>().len();
    let points: Vec<DropoffPoint> = (0..count)
        .map(|index| generate_point(index, vocabulary, distinct))
        .collect();

    debug!(
        "Generated {} drop-off points from {} tags",
        points.len(),
        vocabulary.len()
    );
    Ok(points)
}

fn generate_point(index: usize, vocabulary: &[String], distinct: usize) -> DropoffPoint {
    let ordinal = index + 1;
    let mut rng = Mulberry32::from_key(&format!("dropoff-{ordinal}"));

    let seed = CITY_SEEDS[rng.next_index(CITY_SEEDS.len())];
    let longitude = seed.lng + (rng.next_f64() - 0.5) * LONGITUDE_SPAN;
    let latitude = seed.lat + (rng.next_f64() - 0.5) * LATITUDE_SPAN;

    let category = DropoffCategory::ALL[rng.next_index(DropoffCategory::ALL.len())];
    let tags = draw_tags(&mut rng, vocabulary, distinct);

    let rating = round_one_decimal((3.6 + rng.next_f64() * 1.3).clamp(0.0, 5.0));
    let rating_count = rng.next_in(8.0, 240.0);

    let area = rng.next_in(200.0, 799.0);
    let exchange = rng.next_in(200.0, 799.0);
    let line = rng.next_in(1000.0, 8999.0);
    let phone = format!("({area}) {exchange}-{line}");

    let name = format!(
        "{} {}",
        NAMES_A[rng.next_index(NAMES_A.len())],
        NAMES_B[rng.next_index(NAMES_B.len())]
    );
    let street_number = rng.next_in(10.0, 989.0);
    let street = STREETS[rng.next_index(STREETS.len())];
    let address = format!("{street_number} {street} St, {}", seed.city);
    let hours = HOURS[rng.next_index(HOURS.len())].to_string();
    let pickup = rng.next_f64() < PICKUP_PROBABILITY;
    let hero_image = HERO_IMAGES[rng.next_index(HERO_IMAGES.len())].to_string();

    DropoffPoint {
        id: ordinal.to_string(),
        name,
        category,
        address,
        hours,
        tags,
        pickup,
        phone,
        url: PLACEHOLDER_URL.to_string(),
        rating,
        rating_count,
        location: GeoPoint {
            longitude,
            latitude,
        },
        hero_image,
    }
}

/// Draw distinct tags until the target count is reached.
///
/// The target is clamped to the number of distinct keys in the vocabulary so
/// the loop terminates even when keys repeat. Indices are still drawn over the
/// full slice.
fn draw_tags(rng: &mut Mulberry32, vocabulary: &[String], distinct: usize) -> Vec<String> {
    let target = (MIN_TAGS + rng.next_index(TAG_COUNT_CHOICES)).min(distinct);
    let mut seen = HashSet::with_capacity(target);
    let mut tags = Vec::with_capacity(target);

    while tags.len() < target {
        let tag = &vocabulary[rng.next_index(vocabulary.len())];
        if seen.insert(tag.as_str()) {
            tags.push(tag.clone());
        }
    }
    tags
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
