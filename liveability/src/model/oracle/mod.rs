mod command_oracle;
mod haversine_oracle;
mod od_distance;
mod od_matrix_oracle;
mod oracle_config;
mod oracle_error;
mod routing_oracle;
mod time_limited_oracle;

pub use command_oracle::CommandOracle;
pub use haversine_oracle::HaversineOracle;
pub use od_distance::OdDistance;
pub use od_matrix_oracle::OdMatrixOracle;
pub use oracle_config::OracleConfig;
pub use oracle_error::OracleError;
pub use routing_oracle::{RoutingOracle, RoutingOracleBuilder};
pub use time_limited_oracle::TimeLimitedOracle;
