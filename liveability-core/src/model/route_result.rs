use super::{distance, CategoryCode, CoreError, OriginId};
use geo::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uom::si::f64::Length;

/// the indicator values for one (origin, destination category) pair.
///
/// `distance` of `None` is an explicit "searched, nothing found within the
/// cutoff". an origin that has not been searched has no [`RouteResult`] at all.
///
/// `source_counts` holds the number of destinations found within the count
/// radius per raw destination source, so that a category fed by several
/// datasets can be assembled from independent passes without counting any
/// dataset twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub origin_id: OriginId,
    pub category: CategoryCode,
    pub distance: Option<Length>,
    #[serde(default)]
    pub source_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub geometry: Option<Geometry<f64>>,
}

impl RouteResult {
    /// a searched origin with no destination reachable in range.
    pub fn not_found(origin_id: OriginId, category: CategoryCode) -> RouteResult {
        RouteResult {
            origin_id,
            category,
            distance: None,
            source_counts: BTreeMap::new(),
            geometry: None,
        }
    }

    pub fn found(origin_id: OriginId, category: CategoryCode, distance: Length) -> RouteResult {
        RouteResult {
            origin_id,
            category,
            distance: Some(distance),
            source_counts: BTreeMap::new(),
            geometry: None,
        }
    }

    pub fn with_count(mut self, source: &str, count: u64) -> RouteResult {
        self.source_counts.insert(source.to_string(), count);
        self
    }

    pub fn distance_meters(&self) -> Option<f64> {
        self.distance.as_ref().map(distance::to_meters)
    }

    /// total destinations within the count radius across all sources.
    pub fn count(&self) -> u64 {
        self.source_counts.values().sum()
    }

    pub fn key(&self) -> (&OriginId, &CategoryCode) {
        (&self.origin_id, &self.category)
    }

    /// merges newly computed evidence into this result. the merge is
    /// monotonic and idempotent:
    ///   - a recorded distance is never replaced by a missing one; two
    ///     distances resolve to the shorter, carrying its geometry
    ///   - source tags are unioned and the total count is summed across
    ///     distinct sources; a source seen again keeps its larger count
    ///
    /// counts are additive only between distinct source tags. two results
    /// for the same tag describe the same destinations counted again, as on
    /// a resumed run, so adding them would double count.
    pub fn merge(&mut self, other: &RouteResult) -> Result<(), CoreError> {
        if self.key() != other.key() {
            return Err(CoreError::MergeKeyMismatch(
                other.origin_id.to_string(),
                other.category.to_string(),
                self.origin_id.to_string(),
                self.category.to_string(),
            ));
        }

        let other_is_shorter = match (&self.distance, &other.distance) {
            (None, Some(_)) => true,
            (Some(a), Some(b)) => b < a,
            _ => false,
        };
        let fills_geometry = self.geometry.is_none() && self.distance == other.distance;
        if (other_is_shorter || fills_geometry) && other.geometry.is_some() {
            self.geometry = other.geometry.clone();
        }
        self.distance = distance::min_distance(self.distance, other.distance);

        // same tag: the larger count wins, never the sum
        for (source, count) in other.source_counts.iter() {
            let entry = self.source_counts.entry(source.clone()).or_insert(0);
            *entry = (*entry).max(*count);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;
    use crate::model::distance::from_meters;

    fn key() -> (OriginId, CategoryCode) {
        (OriginId::from("A"), CategoryCode::from("supermarket"))
    }

    #[test]
    fn test_null_never_overwrites_distance() {
        let (o, c) = key();
        let mut stored = RouteResult::found(o.clone(), c.clone(), from_meters(500.0));
        stored
            .merge(&RouteResult::not_found(o, c))
            .expect("keys match");
        assert_eq!(stored.distance_meters(), Some(500.0));
    }

    #[test]
    fn test_distance_fills_in_null() {
        let (o, c) = key();
        let mut stored = RouteResult::not_found(o.clone(), c.clone());
        stored
            .merge(&RouteResult::found(o, c, from_meters(740.0)))
            .expect("keys match");
        assert_eq!(stored.distance_meters(), Some(740.0));
    }

    #[test]
    fn test_counts_add_across_sources() {
        let (o, c) = key();
        let mut a = RouteResult::found(o.clone(), c.clone(), from_meters(300.0)).with_count("osm", 3);
        let b = RouteResult::found(o, c, from_meters(450.0)).with_count("gnaf", 2);
        a.merge(&b).expect("keys match");
        assert_eq!(a.count(), 5);
        assert_eq!(a.distance_meters(), Some(300.0));
    }

    #[test]
    fn test_merge_same_source_is_idempotent() {
        let (o, c) = key();
        let original = RouteResult::found(o, c, from_meters(300.0)).with_count("osm", 3);
        let mut merged = original.clone();
        merged.merge(&original).expect("keys match");
        assert_eq!(merged, original);
    }

    #[test]
    fn test_counts_under_one_source_do_not_add() {
        let (o, c) = key();
        let mut a = RouteResult::found(o.clone(), c.clone(), from_meters(300.0)).with_count("osm", 3);
        let b = RouteResult::found(o.clone(), c.clone(), from_meters(450.0)).with_count("osm", 2);
        a.merge(&b).expect("keys match");
        assert_eq!(a.count(), 3);

        // a third source still adds on top
        let d = RouteResult::found(o, c, from_meters(450.0)).with_count("gnaf", 4);
        a.merge(&d).expect("keys match");
        assert_eq!(a.count(), 7);
    }

    #[test]
    fn test_merge_rejects_other_key() {
        let (o, c) = key();
        let mut a = RouteResult::not_found(o, c.clone());
        let b = RouteResult::not_found(OriginId::from("B"), c);
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn test_shorter_route_brings_geometry() {
        let (o, c) = key();
        let line = geo::Geometry::LineString(geo::line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        let mut a = RouteResult::found(o.clone(), c.clone(), from_meters(900.0));
        let mut b = RouteResult::found(o, c, from_meters(100.0));
        b.geometry = Some(line.clone());
        a.merge(&b).expect("keys match");
        assert_eq!(a.geometry, Some(line));
    }
}
