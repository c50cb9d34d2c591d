mod ledger_error;
mod progress_ledger;
mod work_unit;

pub use ledger_error::LedgerError;
pub use progress_ledger::ProgressLedger;
pub use work_unit::WorkUnit;
