use super::{DriverError, ResumableDriver, RunSummary, WorkerContext};
use crate::model::ledger::WorkUnit;
use kdam::Bar;
use liveability_core::model::{
    CategoryCode, Destination, DestinationCategory, OriginPoint, ProgressStatus,
};
use std::{collections::HashMap, sync::Arc};

impl ResumableDriver {
    /// the fine-grained pass for units left in ERROR by [`ResumableDriver::run`].
    ///
    /// each ERROR unit is re-run serially, one origin per oracle call, so that
    /// a failing origin no longer takes its neighbours down with it. origins
    /// that still fail are written to the failure table. a unit whose origins
    /// all succeed is marked COMPLETED.
    pub fn run_fallback(&self) -> Result<RunSummary, DriverError> {
        let context = WorkerContext::open(
            0,
            self.database(),
            self.builder(),
            self.oracle_timeout(),
        )?;
        let store = context.store();
        store.ensure_schema()?;

        let by_code: HashMap<&CategoryCode, &DestinationCategory> =
            self.categories().iter().map(|c| (&c.code, c)).collect();
        let mut plan: Vec<(WorkUnit, &DestinationCategory, Vec<OriginPoint>)> = vec![];
        for row in store.ledger().with_status(ProgressStatus::Error)? {
            let Some(code) = row.category.as_ref() else {
                log::warn!(
                    "skipping ERROR row for partition {} without a category",
                    row.partition_id
                );
                continue;
            };
            let Some(category) = by_code.get(code) else {
                log::warn!(
                    "skipping ERROR row {}/{}: category is not configured",
                    row.partition_id,
                    code
                );
                continue;
            };
            let origins = store.load_origins(Some(std::slice::from_ref(&row.partition_id)))?;
            let unit = WorkUnit::new(row.partition_id.clone(), Some(code.clone()));
            plan.push((unit, *category, origins));
        }
        if plan.is_empty() {
            log::info!("no units in ERROR, nothing to retry");
            return Ok(RunSummary::default());
        }

        let total: usize = plan.iter().map(|(_, _, o)| o.len()).sum();
        log::info!(
            "retrying {} units in ERROR one origin at a time ({} origins)",
            plan.len(),
            total
        );
        let mut bar = Bar::builder()
            .desc("fallback origins")
            .total(total)
            .build()
            .map_err(|e| DriverError::ProgressBarError(e.to_string()))?;

        let mut destinations_by_code: HashMap<CategoryCode, Arc<[Destination]>> = HashMap::new();
        let mut outcomes = vec![];
        for (unit, category, origins) in plan.iter() {
            let destinations = match destinations_by_code.get(&category.code) {
                Some(destinations) => Arc::clone(destinations),
                None => {
                    let loaded: Arc<[Destination]> = store.destinations_for(category)?.into();
                    destinations_by_code.insert(category.code.clone(), loaded.clone());
                    loaded
                }
            };
            let outcome =
                context.process_unit_per_origin(unit, category, &destinations, origins, &mut bar)?;
            outcomes.push(outcome);
        }
        eprintln!();
        store.finalize()?;

        let summary = RunSummary::new(outcomes);
        summary.log();
        Ok(summary)
    }
}
