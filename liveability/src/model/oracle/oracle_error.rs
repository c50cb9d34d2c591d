use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("routing oracle {0} failed: {1}")]
    SolveFailed(String, String),
    #[error("routing oracle {0} did not respond within {1:?}")]
    Timeout(String, Duration),
    #[error("failure building routing oracle: {0}")]
    BuildFailed(String),
    #[error("routing oracle i/o failure: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure decoding routing oracle JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
}
