use super::UnitOutcome;
use crate::model::ledger::WorkUnit;

/// the outcomes of every unit dispatched in one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<UnitOutcome>,
}

impl RunSummary {
    pub fn new(mut outcomes: Vec<UnitOutcome>) -> RunSummary {
        outcomes.sort_by(|a, b| a.unit.cmp(&b.unit));
        RunSummary { outcomes }
    }

    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    pub fn errored(&self) -> usize {
        self.outcomes.len() - self.completed()
    }

    pub fn errored_units(&self) -> Vec<&WorkUnit> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_completed())
            .map(|o| &o.unit)
            .collect()
    }

    /// true when nothing dispatched in this run ended in ERROR.
    pub fn is_complete(&self) -> bool {
        self.errored() == 0
    }

    pub fn log(&self) {
        log::info!(
            "run finished: {} units dispatched, {} completed, {} errored",
            self.outcomes.len(),
            self.completed(),
            self.errored()
        );
        for unit in self.errored_units() {
            log::warn!("unit {unit} ended in ERROR, re-run or use the fallback pass");
        }
    }
}
