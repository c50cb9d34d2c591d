use super::DestinationId;
use geo::Point;
use serde::{Deserialize, Serialize};

/// a single place of interest. `source` names the raw dataset the feature
/// was read from, which a [`super::DestinationCategory`] maps into a
/// logical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub source: String,
    pub coordinate: Point<f64>,
}
