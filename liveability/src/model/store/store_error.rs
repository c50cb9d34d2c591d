use liveability_core::model::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failure opening database {0}: {1}")]
    OpenError(String, rusqlite::Error),
    #[error("database failure: {source}")]
    SqliteError {
        #[from]
        source: rusqlite::Error,
    },
    #[error("failure encoding row as JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid row in table {0}: {1}")]
    InvalidRow(String, String),
    #[error(transparent)]
    CoreError(#[from] CoreError),
}
