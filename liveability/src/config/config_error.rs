use crate::model::{oracle::OracleError, partition::PartitionError};
use liveability_core::model::CoreError;

/// any problem with configuration. these are fatal at startup, before a
/// single unit of work is dispatched.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{msg}: {source}")]
    ConfigReadError {
        msg: String,
        source: ::config::ConfigError,
    },
    #[error("failed reading '{filepath}': {source}")]
    CsvError { filepath: String, source: csv::Error },
    #[error("failed reading '{filepath}': {source}")]
    IoError {
        filepath: String,
        source: std::io::Error,
    },
    #[error("invalid study region in '{0}': {1}")]
    InvalidStudyRegion(String, String),
    #[error("invalid destination category: {source}")]
    InvalidCategory {
        #[from]
        source: CoreError,
    },
    #[error("invalid partition method: {source}")]
    InvalidPartition {
        #[from]
        source: PartitionError,
    },
    #[error("invalid routing oracle: {source}")]
    InvalidOracle {
        #[from]
        source: OracleError,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failure writing default configuration: {0}")]
    SerializeError(String),
}
