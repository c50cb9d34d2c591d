use super::{DriverError, UnitOutcome};
use crate::model::{
    accumulator::{indicator_ops, DEFAULT_BATCH_SIZE},
    ledger::WorkUnit,
    oracle::{OracleError, RoutingOracle, RoutingOracleBuilder, TimeLimitedOracle},
    partition::WorkPartitioner,
    store::Store,
};
use kdam::{Bar, BarExt};
use liveability_core::model::{
    Destination, DestinationCategory, OriginPoint, ProgressStatus, RouteResult,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// the resources owned by one worker: its own database connection and the
/// routing oracle session its builder handed out.
pub struct WorkerContext {
    pub worker_id: usize,
    store: Store,
    oracle: Arc<dyn RoutingOracle>,
    time_limit: Option<TimeLimitedOracle>,
}

impl WorkerContext {
    pub fn open(
        worker_id: usize,
        database: &str,
        builder: &dyn RoutingOracleBuilder,
        oracle_timeout: Option<Duration>,
    ) -> Result<WorkerContext, DriverError> {
        let store = Store::open(database)?;
        let oracle = builder.build()?;
        let time_limit =
            oracle_timeout.map(|timeout| TimeLimitedOracle::new(oracle.clone(), timeout));
        log::debug!(
            "worker {} opened {} with oracle {}",
            worker_id,
            store.name(),
            oracle.name()
        );
        Ok(WorkerContext {
            worker_id,
            store,
            oracle,
            time_limit,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// runs one (partition, category) unit in oracle-sized sub-batches.
    ///
    /// a failed oracle call is logged and the remaining sub-batches still run;
    /// the unit then ends in ERROR. results of the sub-batches that did solve
    /// are kept. ledger and result writes must succeed: their failures are
    /// returned.
    pub fn process_unit(
        &self,
        unit: &WorkUnit,
        category: &DestinationCategory,
        destinations: &Arc<[Destination]>,
        origins: &[OriginPoint],
        partitioner: &WorkPartitioner,
    ) -> Result<UnitOutcome, DriverError> {
        let start = Instant::now();
        let item_count = origins.len() as u64;
        self.store
            .ledger()
            .mark(unit, item_count, ProgressStatus::Running, 0.0)?;
        let accumulator = self.store.accumulator(DEFAULT_BATCH_SIZE);

        let mut failed_calls = 0;
        let mut results_written = 0;
        for (chunk_idx, chunk) in partitioner.sub_batches(origins).enumerate() {
            match self.solve(chunk, category, destinations) {
                Ok(results) => {
                    results_written += accumulator.upsert_results(&results)?;
                }
                Err(e) => {
                    failed_calls += 1;
                    log::error!(
                        "worker {} unit {} chunk {} ({} origins): {}",
                        self.worker_id,
                        unit,
                        chunk_idx,
                        chunk.len(),
                        e
                    );
                }
            }
        }
        self.finish(unit, item_count, failed_calls, results_written, start)
    }

    /// retries a unit one origin at a time. origins that still fail are
    /// recorded in the failure table; origins that now succeed have any
    /// earlier failure record removed.
    pub fn process_unit_per_origin(
        &self,
        unit: &WorkUnit,
        category: &DestinationCategory,
        destinations: &Arc<[Destination]>,
        origins: &[OriginPoint],
        bar: &mut Bar,
    ) -> Result<UnitOutcome, DriverError> {
        let start = Instant::now();
        let item_count = origins.len() as u64;
        self.store
            .ledger()
            .mark(unit, item_count, ProgressStatus::Running, 0.0)?;
        let accumulator = self.store.accumulator(DEFAULT_BATCH_SIZE);

        let mut failed_calls = 0;
        let mut results_written = 0;
        for origin in origins.iter() {
            match self.solve(std::slice::from_ref(origin), category, destinations) {
                Ok(results) => {
                    results_written += accumulator.upsert_results(&results)?;
                    self.store
                        .clear_origin_failure(&origin.id, &category.code)?;
                }
                Err(e) => {
                    failed_calls += 1;
                    log::warn!(
                        "origin {} of unit {} failed on its own: {}",
                        origin.id,
                        unit,
                        e
                    );
                    self.store.record_origin_failure(
                        &origin.id,
                        &category.code,
                        &unit.partition_id,
                        &e.to_string(),
                    )?;
                }
            }
            let _ = bar.update(1);
        }
        self.finish(unit, item_count, failed_calls, results_written, start)
    }

    /// solves a chunk against a category and reduces the answer to one
    /// result per origin. a category with no destinations at all needs no
    /// oracle call: every origin gets an explicit null.
    fn solve(
        &self,
        chunk: &[OriginPoint],
        category: &DestinationCategory,
        destinations: &Arc<[Destination]>,
    ) -> Result<Vec<RouteResult>, OracleError> {
        let cutoff = category.search_cutoff();
        let pairs = match &self.time_limit {
            _ if destinations.is_empty() => vec![],
            Some(limited) => limited.solve_shared(chunk, destinations.clone(), cutoff)?,
            None => self.oracle.solve(chunk, destinations, cutoff)?,
        };
        Ok(indicator_ops::summarise(
            chunk,
            category,
            destinations,
            &pairs,
        ))
    }

    fn finish(
        &self,
        unit: &WorkUnit,
        item_count: u64,
        failed_calls: usize,
        results_written: usize,
        start: Instant,
    ) -> Result<UnitOutcome, DriverError> {
        let status = if failed_calls == 0 {
            ProgressStatus::Completed
        } else {
            ProgressStatus::Error
        };
        let duration_minutes = start.elapsed().as_secs_f64() / 60.0;
        self.store
            .ledger()
            .mark(unit, item_count, status, duration_minutes)?;
        match status {
            ProgressStatus::Completed => log::info!(
                "unit {} COMPLETED: {} origins, {} results in {:.2} minutes",
                unit,
                item_count,
                results_written,
                duration_minutes
            ),
            _ => log::error!(
                "unit {} ERROR: {} origins, {} failed oracle calls, {} results kept, {:.2} minutes",
                unit,
                item_count,
                failed_calls,
                results_written,
                duration_minutes
            ),
        }
        Ok(UnitOutcome {
            unit: unit.clone(),
            item_count,
            status,
            failed_calls,
            results_written,
            duration_minutes,
        })
    }
}
