use super::{OdDistance, OracleError, RoutingOracle};
use liveability_core::model::{distance, Destination, DestinationId, OriginId, OriginPoint};
use serde::Deserialize;
use std::collections::HashMap;
use uom::si::f64::Length;

/// answers from an origin-destination matrix computed ahead of time by an
/// external network engine, read from a CSV with columns
/// `origin_id,destination_id,distance_m`.
pub struct OdMatrixOracle {
    file: String,
    matrix: HashMap<(OriginId, DestinationId), f64>,
}

#[derive(Deserialize)]
struct OdMatrixRow {
    origin_id: String,
    destination_id: String,
    distance_m: Option<f64>,
}

impl OdMatrixOracle {
    pub fn from_file(file: &str) -> Result<OdMatrixOracle, OracleError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(file)
            .map_err(|e| OracleError::BuildFailed(format!("failure reading {file}: {e}")))?;
        let mut matrix = HashMap::new();
        for (idx, row) in reader.deserialize::<OdMatrixRow>().enumerate() {
            let row = row.map_err(|e| {
                OracleError::BuildFailed(format!("failure reading {file} row {idx}: {e}"))
            })?;
            // an empty distance is an explicit "no path"; leaving it out of the
            // matrix means the same thing
            if let Some(d) = row.distance_m {
                matrix.insert(
                    (OriginId(row.origin_id), DestinationId(row.destination_id)),
                    d,
                );
            }
        }
        log::info!("loaded {} origin-destination pairs from {}", matrix.len(), file);
        Ok(OdMatrixOracle {
            file: file.to_string(),
            matrix,
        })
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

impl RoutingOracle for OdMatrixOracle {
    fn name(&self) -> String {
        format!("od_matrix({})", self.file)
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
                let key = (o.id.clone(), d.id.clone());
                if let Some(meters) = self.matrix.get(&key) {
                    if *meters <= cutoff_m {
                        result.push(OdDistance::new(
                            key.0,
                            key.1,
                            distance::from_meters(*meters),
                        ));
                    }
                }
            }
        }
        Ok(result)
    }
}
