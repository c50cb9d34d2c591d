use super::{OdDistance, OracleError, RoutingOracle};
use geo::{Distance, Haversine, LineString};
use liveability_core::model::{distance, Destination, OriginPoint};
use uom::si::f64::Length;

/// great-circle distance scaled by a circuity factor to approximate network
/// distance. stands in for a network engine on smoke runs and in areas
/// without a routable network.
#[derive(Debug, Clone, Copy)]
pub struct HaversineOracle {
    pub circuity: f64,
    pub geometry: bool,
}

impl HaversineOracle {
    pub fn new(circuity: f64, geometry: bool) -> HaversineOracle {
        HaversineOracle { circuity, geometry }
    }
}

impl RoutingOracle for HaversineOracle {
    fn name(&self) -> String {
        format!("haversine(circuity={})", self.circuity)
    }

    fn solve(
        &self,
        origins: &[OriginPoint],
        destinations: &[Destination],
        cutoff: Length,
    ) -> Result<Vec<OdDistance>, OracleError> {
        let cutoff_m = distance::to_meters(&cutoff);
        let mut result = vec![];
        for o in origins.iter() {
            for d in destinations.iter() {
                let meters = Haversine.distance(o.coordinate, d.coordinate) * self.circuity;
                if meters > cutoff_m {
                    continue;
                }
                let mut pair = OdDistance::new(
                    o.id.clone(),
                    d.id.clone(),
                    distance::from_meters(meters),
                );
                if self.geometry {
                    let line = LineString::from(vec![o.coordinate, d.coordinate]);
                    pair.geometry = Some(geo::Geometry::LineString(line));
                }
                result.push(pair);
            }
        }
        Ok(result)
    }
}
