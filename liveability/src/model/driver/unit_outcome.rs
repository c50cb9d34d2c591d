use crate::model::ledger::WorkUnit;
use liveability_core::model::ProgressStatus;

/// how one work unit ended in a driver or fallback run.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutcome {
    pub unit: WorkUnit,
    pub item_count: u64,
    /// COMPLETED or ERROR
    pub status: ProgressStatus,
    /// oracle calls that failed. in the fallback pass each call covers a
    /// single origin.
    pub failed_calls: usize,
    pub results_written: usize,
    pub duration_minutes: f64,
}

impl UnitOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}
