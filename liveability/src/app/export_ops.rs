use super::LiveabilityCliError;
use crate::model::{accumulator::DEFAULT_BATCH_SIZE, store::Store};
use kdam::tqdm;
use liveability_core::model::CategoryCode;
use serde::Serialize;
use wkt::ToWkt;

/// one line of the exported indicator table. `distance_m` is empty for
/// origins searched with nothing found.
#[derive(Serialize)]
struct ExportRow<'a> {
    origin_id: &'a str,
    category: &'a str,
    distance_m: Option<f64>,
    count: u64,
    source_counts: String,
    geometry: Option<String>,
}

/// writes stored route results to a CSV file, optionally for one category.
/// returns the number of rows written.
pub fn export_results(
    store: &Store,
    filepath: &str,
    category: Option<&CategoryCode>,
) -> Result<usize, LiveabilityCliError> {
    let results = store.accumulator(DEFAULT_BATCH_SIZE).load_results(category)?;
    let write_error = |source| LiveabilityCliError::CsvWriteError {
        filepath: filepath.to_string(),
        source,
    };
    let mut writer = csv::Writer::from_path(filepath).map_err(write_error)?;
    for result in tqdm!(results.iter(), total = results.len(), desc = "export") {
        let source_counts = result
            .source_counts
            .iter()
            .map(|(source, n)| format!("{source}:{n}"))
            .collect::<Vec<_>>()
            .join(";");
        writer
            .serialize(ExportRow {
                origin_id: result.origin_id.as_str(),
                category: result.category.as_str(),
                distance_m: result.distance_meters(),
                count: result.count(),
                source_counts,
                geometry: result.geometry.as_ref().map(|g| g.wkt_string()),
            })
            .map_err(write_error)?;
    }
    eprintln!();
    writer.flush().map_err(|source| LiveabilityCliError::IoError {
        filepath: filepath.to_string(),
        source,
    })?;
    log::info!("wrote {} route results to {}", results.len(), filepath);
    Ok(results.len())
}
