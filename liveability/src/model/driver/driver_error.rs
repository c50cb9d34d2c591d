use crate::model::{
    accumulator::AccumulatorError, ledger::LedgerError, oracle::OracleError, store::StoreError,
};
use thiserror::Error;

/// failures that abort a driver run. oracle failures while solving a unit are
/// not among them: those are recorded against the unit in the ledger.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    StoreError {
        #[from]
        source: StoreError,
    },
    #[error(transparent)]
    LedgerError {
        #[from]
        source: LedgerError,
    },
    #[error(transparent)]
    AccumulatorError {
        #[from]
        source: AccumulatorError,
    },
    #[error("failure creating routing oracle session: {source}")]
    OracleSessionError {
        #[from]
        source: OracleError,
    },
    #[error("failure building worker pool: {0}")]
    ThreadPoolError(String),
    #[error("failure building progress bar: {0}")]
    ProgressBarError(String),
}
