use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown progress status '{0}'")]
    UnknownStatus(String),
    #[error("cannot merge result for ({0}, {1}) into result for ({2}, {3})")]
    MergeKeyMismatch(String, String, String, String),
    #[error("invalid destination category '{0}': {1}")]
    InvalidCategory(String, String),
}
