use super::PartitionError;
use geo::Point;
use liveability_core::model::PartitionId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// how partition ids are assigned to origins on import when the source data
/// does not already carry one.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PartitionMethod {
    /// the hexagonal h3 cell containing the origin at the given resolution.
    /// resolution 8 cells are roughly 0.7 km² which keeps a dense urban cell
    /// to a few thousand addresses.
    H3 { resolution: u8 },
}

impl Display for PartitionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionMethod::H3 { resolution } => write!(f, "h3({resolution})"),
        }
    }
}

impl PartitionMethod {
    pub fn validate(&self) -> Result<(), PartitionError> {
        match self {
            PartitionMethod::H3 { resolution } => {
                h3o::Resolution::try_from(*resolution)
                    .map_err(|_| PartitionError::InvalidResolution(*resolution))?;
                Ok(())
            }
        }
    }

    /// assigns a partition to a WGS84 (lon, lat) point.
    pub fn assign(&self, point: &Point<f64>) -> Result<PartitionId, PartitionError> {
        match self {
            PartitionMethod::H3 { resolution } => {
                let res = h3o::Resolution::try_from(*resolution)
                    .map_err(|_| PartitionError::InvalidResolution(*resolution))?;
                let latlng = h3o::LatLng::new(point.y(), point.x()).map_err(|e| {
                    PartitionError::InvalidCoordinate(point.x(), point.y(), e.to_string())
                })?;
                let cell = latlng.to_cell(res);
                Ok(PartitionId(cell.to_string()))
            }
        }
    }
}
