//! read-only reports over the ledger and the result table.
use super::LiveabilityCliError;
use crate::model::{
    accumulator::DEFAULT_BATCH_SIZE,
    store::{OriginFailure, Store},
};
use liveability_core::model::{DestinationCategory, PartitionProgress, ProgressStatus};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub counts: Vec<(ProgressStatus, u64)>,
    pub errored: Vec<PartitionProgress>,
    pub origin_failures: Vec<OriginFailure>,
}

/// completeness of one category across all imported origins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub name: String,
    pub domain: String,
    pub origins: u64,
    pub found: u64,
    pub not_found: u64,
    pub not_searched: u64,
}

pub fn status(store: &Store) -> Result<StatusReport, LiveabilityCliError> {
    let ledger = store.ledger();
    Ok(StatusReport {
        counts: ledger.status_counts()?,
        errored: ledger.with_status(ProgressStatus::Error)?,
        origin_failures: store.origin_failures()?,
    })
}

pub fn summary(
    store: &Store,
    categories: &[DestinationCategory],
) -> Result<Vec<CategorySummary>, LiveabilityCliError> {
    let origins = store.count_origins()?;
    let completeness = store.accumulator(DEFAULT_BATCH_SIZE).completeness()?;
    let rows = categories
        .iter()
        .map(|c| {
            let (found, not_found) = completeness.get(&c.code).copied().unwrap_or((0, 0));
            CategorySummary {
                category: c.code.to_string(),
                name: c.name.clone(),
                domain: c.domain.clone(),
                origins,
                found,
                not_found,
                not_searched: origins.saturating_sub(found + not_found),
            }
        })
        .collect();
    Ok(rows)
}

pub fn print_status(report: &StatusReport) {
    println!("status,units");
    for (status, n) in report.counts.iter() {
        println!("{status},{n}");
    }
    if !report.errored.is_empty() {
        println!();
        println!("units in ERROR:");
        for row in report.errored.iter() {
            println!(
                "  {} ({} origins, last attempt {})",
                row.key_string(),
                row.item_count,
                row.updated_at.to_rfc3339()
            );
        }
    }
    if !report.origin_failures.is_empty() {
        println!();
        println!("origins failing on their own:");
        for f in report.origin_failures.iter() {
            println!(
                "  {} {}/{}: {}",
                f.origin_id, f.partition_id, f.category, f.message
            );
        }
    }
}

pub fn print_summary(rows: &[CategorySummary]) -> Result<(), LiveabilityCliError> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for row in rows.iter() {
        writer
            .serialize(row)
            .map_err(|source| LiveabilityCliError::CsvWriteError {
                filepath: String::from("<stdout>"),
                source,
            })?;
    }
    writer.flush().map_err(|source| LiveabilityCliError::IoError {
        filepath: String::from("<stdout>"),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveability_core::model::{
        distance::from_meters, CategoryCode, OriginId, OriginPoint, PartitionId, RouteResult,
    };

    #[test]
    fn test_summary_separates_found_null_and_unsearched() {
        let store = Store::open_in_memory().expect("open");
        store.ensure_schema().expect("schema");
        let origins = ["A", "B", "C"]
            .iter()
            .map(|id| OriginPoint::new(OriginId::from(*id), geo::Point::new(0.0, 0.0), PartitionId::from("1")))
            .collect::<Vec<_>>();
        store.upsert_origins(&origins).expect("origins");
        let code = CategoryCode::from("supermarket");
        store
            .accumulator(10)
            .upsert_results(&[
                RouteResult::found(OriginId::from("A"), code.clone(), from_meters(500.0)),
                RouteResult::not_found(OriginId::from("B"), code.clone()),
            ])
            .expect("results");
        let category = DestinationCategory {
            code,
            name: String::from("Supermarket"),
            domain: String::from("food"),
            cutoff_closest: from_meters(1000.0),
            cutoff_count: from_meters(1000.0),
            sources: vec![],
        };
        let rows = summary(&store, &[category]).expect("summary");
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].found, rows[0].not_found, rows[0].not_searched), (1, 1, 1));
    }
}
