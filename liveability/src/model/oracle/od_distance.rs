use geo::Geometry;
use liveability_core::model::{DestinationId, OriginId};
use uom::si::f64::Length;

/// one origin-destination answer from a routing oracle. `distance` of `None`
/// means the oracle found no path within the cutoff; pairs the oracle does not
/// mention at all are read the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct OdDistance {
    pub origin_id: OriginId,
    pub destination_id: DestinationId,
    pub distance: Option<Length>,
    pub geometry: Option<Geometry<f64>>,
}

impl OdDistance {
    pub fn new(origin_id: OriginId, destination_id: DestinationId, distance: Length) -> OdDistance {
        OdDistance {
            origin_id,
            destination_id,
            distance: Some(distance),
            geometry: None,
        }
    }

    pub fn no_path(origin_id: OriginId, destination_id: DestinationId) -> OdDistance {
        OdDistance {
            origin_id,
            destination_id,
            distance: None,
            geometry: None,
        }
    }
}
