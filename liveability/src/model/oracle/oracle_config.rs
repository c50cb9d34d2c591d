use super::{
    CommandOracle, HaversineOracle, OdMatrixOracle, OracleError, RoutingOracle,
    RoutingOracleBuilder,
};
use serde::{Deserialize, Serialize};
use std::{env, path::Path, sync::Arc, time::Duration};

/// selects and parameterizes the routing oracle backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum OracleConfig {
    /// straight-line distance times a circuity factor
    Haversine {
        #[serde(default = "default_circuity")]
        circuity: f64,
        #[serde(default)]
        geometry: bool,
    },
    /// precomputed origin-destination matrix CSV
    OdMatrix { file: String },
    /// external routing program speaking JSON on stdin/stdout
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

fn default_circuity() -> f64 {
    1.0
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig::Haversine {
            circuity: default_circuity(),
            geometry: false,
        }
    }
}

impl OracleConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            OracleConfig::Haversine { circuity, .. } if !circuity.is_finite() || *circuity < 1.0 => {
                Err(format!("haversine circuity must be >= 1.0, found {circuity}"))
            }
            OracleConfig::OdMatrix { file } if file.trim().is_empty() => {
                Err(String::from("od_matrix oracle requires a file"))
            }
            OracleConfig::Command { program, .. } if program.trim().is_empty() => {
                Err(String::from("command oracle requires a program"))
            }
            _ => Ok(()),
        }
    }
}

impl OracleConfig {
    /// loads the backend. a command oracle given `timeout` kills its program
    /// when a call runs past it; the other backends ignore `timeout`.
    pub fn build_session(
        &self,
        timeout: Option<Duration>,
    ) -> Result<Arc<dyn RoutingOracle>, OracleError> {
        self.validate().map_err(OracleError::BuildFailed)?;
        let oracle: Arc<dyn RoutingOracle> = match self {
            OracleConfig::Haversine { circuity, geometry } => {
                Arc::new(HaversineOracle::new(*circuity, *geometry))
            }
            OracleConfig::OdMatrix { file } => Arc::new(OdMatrixOracle::from_file(file)?),
            OracleConfig::Command { program, args } => {
                if !is_executable_on_path(program) {
                    return Err(OracleError::BuildFailed(format!(
                        "routing program '{program}' not found"
                    )));
                }
                Arc::new(CommandOracle::new(program.clone(), args.clone()).with_timeout(timeout))
            }
        };
        Ok(oracle)
    }

    /// true when sessions from [`OracleConfig::build_session`] enforce the
    /// timeout themselves.
    pub fn enforces_timeout(&self) -> bool {
        matches!(self, OracleConfig::Command { .. })
    }
}

impl RoutingOracleBuilder for OracleConfig {
    fn build(&self) -> Result<Arc<dyn RoutingOracle>, OracleError> {
        self.build_session(None)
    }
}

/// a program given as a path must exist; a bare name must be found on `PATH`.
fn is_executable_on_path(program: &str) -> bool {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file();
    }
    env::var_os("PATH")
        .map(|dirs| env::split_paths(&dirs).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
