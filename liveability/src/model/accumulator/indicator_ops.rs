//! turns raw origin-destination distances from a routing oracle into the
//! per-origin indicators of one destination category.
use crate::model::oracle::OdDistance;
use liveability_core::model::{
    distance, Destination, DestinationCategory, DestinationId, OriginId, OriginPoint, RouteResult,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// summarises oracle output for a chunk of origins against one category.
///
/// every origin in `origins` yields exactly one [`RouteResult`]:
///   - `distance` is the shortest path to a destination within
///     `cutoff_closest`, or an explicit null when there is none
///   - `source_counts` has one entry per source tag of the category with the
///     number of distinct destinations of that source within `cutoff_count`
///
/// pairs naming unknown origins or destinations are ignored.
pub fn summarise(
    origins: &[OriginPoint],
    category: &DestinationCategory,
    destinations: &[Destination],
    pairs: &[OdDistance],
) -> Vec<RouteResult> {
    let source_of: HashMap<&DestinationId, &str> = destinations
        .iter()
        .map(|d| (&d.id, d.source.as_str()))
        .collect();
    let mut by_origin: HashMap<&OriginId, Vec<&OdDistance>> = HashMap::new();
    for pair in pairs.iter() {
        if pair.distance.is_some() && source_of.contains_key(&pair.destination_id) {
            by_origin.entry(&pair.origin_id).or_default().push(pair);
        }
    }

    let tags = category.source_tags();
    origins
        .iter()
        .map(|origin| {
            let found = by_origin.get(&origin.id).map(Vec::as_slice).unwrap_or(&[]);
            let closest = found
                .iter()
                .filter_map(|p| p.distance.map(|d| (d, *p)))
                .filter(|(d, _)| *d <= category.cutoff_closest)
                .min_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let mut result = match closest {
                Some((d, pair)) => {
                    let mut r = RouteResult::found(origin.id.clone(), category.code.clone(), d);
                    r.geometry = pair.geometry.clone();
                    r
                }
                None => RouteResult::not_found(origin.id.clone(), category.code.clone()),
            };

            let mut within: BTreeMap<&str, HashSet<&DestinationId>> = BTreeMap::new();
            for pair in found.iter() {
                let in_radius = pair
                    .distance
                    .map(|d| d <= category.cutoff_count)
                    .unwrap_or(false);
                if !in_radius {
                    continue;
                }
                if let Some(source) = source_of.get(&pair.destination_id) {
                    within.entry(*source).or_default().insert(&pair.destination_id);
                }
            }
            for tag in tags.iter() {
                let n = within.get(tag.as_str()).map(|s| s.len()).unwrap_or(0);
                result = result.with_count(tag, n as u64);
            }
            log::trace!(
                "origin {} category {} distance {:?} count {}",
                origin.id,
                category.code,
                result.distance.as_ref().map(distance::to_meters),
                result.count()
            );
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveability_core::model::{distance::from_meters, CategoryCode, PartitionId};

    fn category() -> DestinationCategory {
        DestinationCategory {
            code: CategoryCode::from("food"),
            name: String::from("Food retail"),
            domain: String::from("food"),
            cutoff_closest: from_meters(1000.0),
            cutoff_count: from_meters(1600.0),
            sources: vec![String::from("supermarket"), String::from("grocer")],
        }
    }

    fn origin(id: &str) -> OriginPoint {
        OriginPoint::new(OriginId::from(id), geo::Point::new(0.0, 0.0), PartitionId::from("p"))
    }

    fn dest(id: &str, source: &str) -> Destination {
        Destination {
            id: DestinationId::from(id),
            source: source.to_string(),
            coordinate: geo::Point::new(0.0, 0.0),
        }
    }

    fn pair(o: &str, d: &str, m: f64) -> OdDistance {
        OdDistance::new(OriginId::from(o), DestinationId::from(d), from_meters(m))
    }

    #[test]
    fn test_closest_and_counts() {
        let destinations = vec![dest("s1", "supermarket"), dest("s2", "supermarket"), dest("g1", "grocer")];
        let pairs = vec![
            pair("A", "s1", 1200.0),
            pair("A", "s2", 1500.0),
            pair("A", "g1", 800.0),
            pair("A", "g1", 800.0),
        ];
        let results = summarise(&[origin("A")], &category(), &destinations, &pairs);
        assert_eq!(results.len(), 1);
        let a = &results[0];
        assert_eq!(a.distance_meters(), Some(800.0));
        assert_eq!(a.source_counts.get("supermarket"), Some(&2));
        assert_eq!(a.source_counts.get("grocer"), Some(&1));
        assert_eq!(a.count(), 3);
    }

    #[test]
    fn test_nothing_within_closest_cutoff_is_explicit_null() {
        let destinations = vec![dest("s1", "supermarket")];
        let pairs = vec![pair("A", "s1", 1400.0)];
        let results = summarise(&[origin("A"), origin("B")], &category(), &destinations, &pairs);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].distance, None);
        assert_eq!(results[0].count(), 1);
        assert_eq!(results[1].distance, None);
        assert_eq!(results[1].count(), 0);
    }
}
