use liveability_core::model::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccumulatorError {
    #[error("failure writing route results: {source}")]
    SqliteError {
        #[from]
        source: rusqlite::Error,
    },
    #[error("failure encoding source counts: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
    #[error("stored route result for {0} is invalid: {1}")]
    InvalidRow(String, String),
    #[error(transparent)]
    CoreError(#[from] CoreError),
}
