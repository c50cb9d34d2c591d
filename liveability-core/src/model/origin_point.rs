use super::{OriginId, PartitionId};
use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// an address or residential unit for which indicators are computed. origins
/// are created on import and are never modified by the indicator pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginPoint {
    pub id: OriginId,
    pub coordinate: Point<f64>,
    pub partition_id: PartitionId,
    /// linkage to administrative areas, e.g. `{"mb_code": "20663975000", "sa1": "20604112202"}`
    #[serde(default)]
    pub areas: BTreeMap<String, String>,
}

impl OriginPoint {
    pub fn new(id: OriginId, coordinate: Point<f64>, partition_id: PartitionId) -> OriginPoint {
        OriginPoint {
            id,
            coordinate,
            partition_id,
            areas: BTreeMap::new(),
        }
    }
}
