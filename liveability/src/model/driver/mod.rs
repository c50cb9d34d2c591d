mod driver_error;
mod fallback_pass;
mod resumable_driver;
mod run_summary;
mod unit_outcome;
mod worker_context;

pub use driver_error::DriverError;
pub use resumable_driver::{ResumableDriver, DEFAULT_WORKERS};
pub use run_summary::RunSummary;
pub use unit_outcome::UnitOutcome;
pub use worker_context::WorkerContext;
