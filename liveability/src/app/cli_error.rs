use crate::config::ConfigError;
use crate::model::{
    accumulator::AccumulatorError, driver::DriverError, ledger::LedgerError,
    partition::PartitionError, store::StoreError,
};

#[derive(thiserror::Error, Debug)]
pub enum LiveabilityCliError {
    #[error(transparent)]
    ConfigError {
        #[from]
        source: ConfigError,
    },
    #[error(transparent)]
    DriverError {
        #[from]
        source: DriverError,
    },
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
    #[error(transparent)]
    PartitionError {
        #[from]
        source: PartitionError,
    },
    #[error("failed reading '{filepath}': {source}")]
    CsvReadError { filepath: String, source: csv::Error },
    #[error("failed writing '{filepath}': {source}")]
    CsvWriteError { filepath: String, source: csv::Error },
    #[error("failed writing '{filepath}': {source}")]
    IoError {
        filepath: String,
        source: std::io::Error,
    },
    #[error("'{filepath}' row {row}: {msg}")]
    InvalidRow {
        filepath: String,
        row: usize,
        msg: String,
    },
    #[error("{0}")]
    InvalidInput(String),
}

impl LiveabilityCliError {
    /// true for failures caused by configuration, which are reported with a
    /// distinct exit code.
    pub fn is_config_error(&self) -> bool {
        matches!(self, LiveabilityCliError::ConfigError { .. })
    }
}
