use liveability_core::model::{CoreError, ProgressStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("failure writing progress ledger: {source}")]
    SqliteError {
        #[from]
        source: rusqlite::Error,
    },
    #[error("progress ledger for {0} cannot move from {1} to {2}")]
    InvalidTransition(String, ProgressStatus, ProgressStatus),
    #[error("invalid progress ledger row for {0}: {1}")]
    InvalidRow(String, String),
    #[error(transparent)]
    CoreError(#[from] CoreError),
}
