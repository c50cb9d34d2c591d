mod category_row;
mod config_error;
mod liveability_config;
mod study_region;

pub use category_row::CategoryRow;
pub use config_error::ConfigError;
pub use liveability_config::{LiveabilityConfig, ENV_PREFIX};
pub use study_region::StudyRegion;
