use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("invalid h3 resolution {0}, must be in [0, 15]")]
    InvalidResolution(u8),
    #[error("coordinate ({0}, {1}) cannot be assigned an h3 cell: {2}")]
    InvalidCoordinate(f64, f64, String),
}
