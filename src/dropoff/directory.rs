//! The session's drop-off point collection

use tracing::info;

use super::filter::{DropoffMatch, FilterCriteria, filter_and_sort};
use super::generator::generate_points;
use crate::models::{DropoffPoint, GeoPoint};
use crate::Result;

/// Read-only set of points, generated once and never mutated
#[derive(Debug, Clone)]
pub struct DropoffDirectory {
    points: Vec<DropoffPoint>,
}

impl DropoffDirectory {
    /// Generate the directory from a point count and tag vocabulary
    pub fn generate(count: usize, vocabulary: &[String]) -> Result<Self> {
        let points = generate_points(count, vocabulary)?;
        info!("Drop-off directory ready with {} points", points.len());
        Ok(Self { points })
    }

    #[must_use]
    pub fn all(&self) -> &[DropoffPoint] {
        &self.points
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&DropoffPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Run the filter pipeline over the whole directory
    pub fn search(&self, criteria: &FilterCriteria, reference: GeoPoint) -> Result<Vec<DropoffMatch<'_>>> {
        filter_and_sort(&self.points, criteria, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dropoff::tags::default_vocabulary;

    #[test]
    fn test_find_by_id() {
        let directory = DropoffDirectory::generate(60, &default_vocabulary()).unwrap();
        assert_eq!(directory.len(), 60);
        assert_eq!(directory.find("1").map(|p| p.name.as_str()), Some("Blue Planet Station"));
        assert!(directory.find("61").is_none());
        assert!(directory.find("").is_none());
    }

    #[test]
    fn test_search_delegates_to_pipeline() {
        let directory = DropoffDirectory::generate(60, &default_vocabulary()).unwrap();
        let reference = GeoPoint::new(-122.3321, 47.6062).unwrap();
        let all = directory.search(&FilterCriteria::default(), reference).unwrap();
        assert_eq!(all.len(), 60);
    }
}
