mod cli;
mod cli_error;
pub mod export_ops;
mod geometry_format;
pub mod import_ops;
pub mod report_ops;

pub use cli::{LiveabilityApp, LiveabilityOperation, RunStatus};
pub use cli_error::LiveabilityCliError;
pub use geometry_format::GeometryFormat;
