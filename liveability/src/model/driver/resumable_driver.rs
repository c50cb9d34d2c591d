use super::{DriverError, RunSummary, UnitOutcome, WorkerContext};
use crate::model::{
    ledger::WorkUnit,
    oracle::RoutingOracleBuilder,
    partition::{Partitions, WorkPartitioner},
    store::Store,
};
use kdam::{Bar, BarExt};
use liveability_core::model::{Destination, DestinationCategory, PartitionId};
use rayon::ThreadPoolBuilder;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

pub const DEFAULT_WORKERS: usize = 4;

/// one (partition, category) unit queued for dispatch, with the category's
/// destinations loaded once and shared between workers.
struct WorkItem {
    unit: WorkUnit,
    category: Arc<DestinationCategory>,
    destinations: Arc<[Destination]>,
}

/// drives the indicator computation to completion, or to a state a later run
/// can resume from.
///
/// each run schedules the (partition, category) units whose ledger row is not
/// COMPLETED and dispatches them across a fixed pool of workers. each worker
/// opens its own [`WorkerContext`] on the database file, so `database` must
/// name a file rather than an in-memory database.
pub struct ResumableDriver {
    database: String,
    builder: Arc<dyn RoutingOracleBuilder>,
    categories: Vec<DestinationCategory>,
    workers: usize,
    partitioner: WorkPartitioner,
    oracle_timeout: Option<Duration>,
}

impl ResumableDriver {
    pub fn new(
        database: &str,
        builder: Arc<dyn RoutingOracleBuilder>,
        categories: Vec<DestinationCategory>,
    ) -> ResumableDriver {
        ResumableDriver {
            database: database.to_string(),
            builder,
            categories,
            workers: DEFAULT_WORKERS,
            partitioner: WorkPartitioner::default(),
            oracle_timeout: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> ResumableDriver {
        self.workers = workers.max(1);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> ResumableDriver {
        self.partitioner = WorkPartitioner::new(chunk_size);
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Option<Duration>) -> ResumableDriver {
        self.oracle_timeout = timeout;
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub(super) fn builder(&self) -> &dyn RoutingOracleBuilder {
        self.builder.as_ref()
    }

    pub(super) fn categories(&self) -> &[DestinationCategory] {
        &self.categories
    }

    pub(super) fn oracle_timeout(&self) -> Option<Duration> {
        self.oracle_timeout
    }

    /// runs every pending unit, optionally restricted to `partition_filter`
    /// (empty means all partitions), then builds indexes on the results.
    pub fn run(&self, partition_filter: &[PartitionId]) -> Result<RunSummary, DriverError> {
        let store = Store::open(&self.database)?;
        store.ensure_schema()?;
        let filter = if partition_filter.is_empty() {
            None
        } else {
            Some(partition_filter)
        };
        let partitions = self.partitioner.partition(store.load_origins(filter)?);
        log::info!(
            "{} origins in {} partitions, {} categories",
            partitions.total_origins(),
            partitions.len(),
            self.categories.len()
        );

        let work = self.plan(&store, &partitions)?;
        let outcomes = if work.is_empty() {
            log::info!("every unit is already COMPLETED, nothing to dispatch");
            vec![]
        } else {
            self.dispatch(work, &partitions)?
        };
        store.finalize()?;
        let summary = RunSummary::new(outcomes);
        summary.log();
        Ok(summary)
    }

    /// the units not yet COMPLETED, registered as PENDING in the ledger.
    fn plan(&self, store: &Store, partitions: &Partitions) -> Result<Vec<WorkItem>, DriverError> {
        let ledger = store.ledger();
        let all_partitions = partitions.ids();
        let mut work = vec![];
        for category in self.categories.iter() {
            let destinations = store.destinations_for(category)?;
            if destinations.is_empty() {
                log::warn!(
                    "category {} has no destinations in sources {:?}",
                    category.code,
                    category.source_tags()
                );
            }
            let pending = ledger.pending_partitions(&all_partitions, Some(&category.code))?;
            log::info!(
                "category {}: {} of {} partitions pending, {} destinations",
                category.code,
                pending.len(),
                all_partitions.len(),
                destinations.len()
            );
            let category = Arc::new(category.clone());
            let destinations: Arc<[Destination]> = destinations.into();
            for partition_id in pending {
                let unit = WorkUnit::new(partition_id, Some(category.code.clone()));
                let item_count = partitions.origins(&unit.partition_id).len() as u64;
                ledger.register_pending(&unit, item_count)?;
                work.push(WorkItem {
                    unit,
                    category: category.clone(),
                    destinations: destinations.clone(),
                });
            }
        }
        Ok(work)
    }

    /// runs `work` on a pool of `workers` threads. each worker pulls units from
    /// a shared queue until it is empty. a worker that hits a store failure
    /// stops every worker from taking further units, and the failure is
    /// returned once the pool has drained.
    fn dispatch(
        &self,
        work: Vec<WorkItem>,
        partitions: &Partitions,
    ) -> Result<Vec<UnitOutcome>, DriverError> {
        let n_workers = self.workers.min(work.len()).max(1);
        let bar = Arc::new(Mutex::new(
            Bar::builder()
                .desc("units")
                .total(work.len())
                .build()
                .map_err(|e| DriverError::ProgressBarError(e.to_string()))?,
        ));
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_workers)
            .thread_name(|idx| format!("liveability-worker-{idx}"))
            .build()
            .map_err(|e| DriverError::ThreadPoolError(e.to_string()))?;
        log::info!("dispatching {} units across {} workers", work.len(), n_workers);

        let queue = Mutex::new(work.into_iter().collect::<VecDeque<_>>());
        let outcomes: Mutex<Vec<UnitOutcome>> = Mutex::new(vec![]);
        let failures: Mutex<Vec<DriverError>> = Mutex::new(vec![]);
        let abort = AtomicBool::new(false);

        pool.scope(|s| {
            for worker_id in 0..n_workers {
                let queue = &queue;
                let outcomes = &outcomes;
                let failures = &failures;
                let abort = &abort;
                let bar = bar.clone();
                s.spawn(move |_| {
                    let result =
                        self.worker_loop(worker_id, queue, outcomes, abort, bar, partitions);
                    if let Err(e) = result {
                        log::error!("worker {worker_id} stopped: {e}");
                        abort.store(true, Ordering::SeqCst);
                        if let Ok(mut f) = failures.lock() {
                            f.push(e);
                        }
                    }
                });
            }
        });
        eprintln!();

        let mut failures = failures.into_inner().unwrap_or_else(|e| e.into_inner());
        if !failures.is_empty() {
            let first = failures.remove(0);
            for other in failures.iter() {
                log::error!("additional worker failure: {other}");
            }
            return Err(first);
        }
        Ok(outcomes.into_inner().unwrap_or_else(|e| e.into_inner()))
    }

    fn worker_loop(
        &self,
        worker_id: usize,
        queue: &Mutex<VecDeque<WorkItem>>,
        outcomes: &Mutex<Vec<UnitOutcome>>,
        abort: &AtomicBool,
        bar: Arc<Mutex<Bar>>,
        partitions: &Partitions,
    ) -> Result<(), DriverError> {
        let context = WorkerContext::open(
            worker_id,
            &self.database,
            self.builder.as_ref(),
            self.oracle_timeout,
        )?;
        loop {
            if abort.load(Ordering::SeqCst) {
                log::debug!("worker {worker_id} stopping after a failure elsewhere");
                break;
            }
            let next = match queue.lock() {
                Ok(mut q) => q.pop_front(),
                Err(_) => None,
            };
            let Some(item) = next else {
                break;
            };
            let origins = partitions.origins(&item.unit.partition_id);
            let outcome = context.process_unit(
                &item.unit,
                &item.category,
                &item.destinations,
                origins,
                &self.partitioner,
            )?;
            if let Ok(mut o) = outcomes.lock() {
                o.push(outcome);
            }
            if let Ok(mut b) = bar.lock() {
                let _ = b.update(1);
            }
        }
        Ok(())
    }
}
