use super::{
    export_ops,
    import_ops::{self, ImportColumns},
    report_ops, LiveabilityCliError,
};
use crate::config::LiveabilityConfig;
use crate::model::store::Store;
use clap::{Parser, Subcommand};
use liveability_core::model::{CategoryCode, PartitionId};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct LiveabilityApp {
    /// TOML or JSON configuration file. values can be overridden with
    /// LIVEABILITY__<KEY> environment variables.
    #[arg(long, short, default_value_t = String::from("liveability.toml"))]
    pub config: String,
    #[command(subcommand)]
    pub op: LiveabilityOperation,
}

#[derive(Subcommand)]
pub enum LiveabilityOperation {
    #[command(about = "write a default configuration file to the --config path")]
    Init {
        /// overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    #[command(
        name = "import-origins",
        about = "load origin points (addresses) from a CSV into the database"
    )]
    ImportOrigins {
        /// CSV with an id column and either a WKT geometry column or x and y columns
        filepath: String,
        #[arg(long)]
        id_column: Option<String>,
        /// column name containing WKT geometry. cannot be used when x|y columns are specified.
        #[arg(long)]
        geometry_column: Option<String>,
        #[arg(long)]
        x_column: Option<String>,
        #[arg(long)]
        y_column: Option<String>,
    },
    #[command(
        name = "import-destinations",
        about = "load destinations from a CSV with id, source and location columns"
    )]
    ImportDestinations {
        filepath: String,
        #[arg(long)]
        id_column: Option<String>,
        /// column name containing WKT geometry. cannot be used when x|y columns are specified.
        #[arg(long)]
        geometry_column: Option<String>,
        #[arg(long)]
        x_column: Option<String>,
        #[arg(long)]
        y_column: Option<String>,
    },
    #[command(about = "compute indicators for every partition not yet COMPLETED")]
    Run {
        /// restrict the run to these partitions. may be repeated.
        #[arg(long = "partition")]
        partitions: Vec<String>,
        /// follow the coarse pass with the per-origin fallback pass
        #[arg(long)]
        fallback: bool,
    },
    #[command(about = "retry units in ERROR one origin at a time")]
    Fallback,
    #[command(about = "report ledger status counts and failing units")]
    Status,
    #[command(about = "report indicator completeness per destination category")]
    Summary,
    #[command(about = "write route results to a CSV file")]
    Export {
        filepath: String,
        /// only export this category
        #[arg(long)]
        category: Option<String>,
    },
}

/// how a command left the work it was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Complete,
    /// at least one unit ended in ERROR
    Incomplete,
}

impl LiveabilityOperation {
    pub fn run(&self, config_file: &str) -> Result<RunStatus, LiveabilityCliError> {
        if let Self::Init { force } = self {
            return init(config_file, *force);
        }
        let conf = LiveabilityConfig::from_file(config_file)?;
        log::info!("using database {}", conf.database);
        match self {
            Self::Init { .. } => Ok(RunStatus::Complete),
            Self::ImportOrigins {
                filepath,
                id_column,
                geometry_column,
                x_column,
                y_column,
            } => {
                let columns = ImportColumns {
                    id_column: id_column.clone(),
                    geometry_column: geometry_column.clone(),
                    x_column: x_column.clone(),
                    y_column: y_column.clone(),
                };
                import_ops::import_origins(&conf, filepath, &columns)?;
                Ok(RunStatus::Complete)
            }
            Self::ImportDestinations {
                filepath,
                id_column,
                geometry_column,
                x_column,
                y_column,
            } => {
                let columns = ImportColumns {
                    id_column: id_column.clone(),
                    geometry_column: geometry_column.clone(),
                    x_column: x_column.clone(),
                    y_column: y_column.clone(),
                };
                import_ops::import_destinations(&conf, filepath, &columns)?;
                Ok(RunStatus::Complete)
            }
            Self::Run {
                partitions,
                fallback,
            } => {
                let driver = conf.build_driver()?;
                let filter = partitions
                    .iter()
                    .map(|p| PartitionId::from(p.as_str()))
                    .collect::<Vec<_>>();
                let mut summary = driver.run(&filter)?;
                if (*fallback || conf.fallback) && !summary.is_complete() {
                    summary = driver.run_fallback()?;
                }
                Ok(status_of(summary.is_complete()))
            }
            Self::Fallback => {
                let driver = conf.build_driver()?;
                let summary = driver.run_fallback()?;
                Ok(status_of(summary.is_complete()))
            }
            Self::Status => {
                let store = Store::open(&conf.database)?;
                store.ensure_schema()?;
                let report = report_ops::status(&store)?;
                report_ops::print_status(&report);
                Ok(status_of(report.errored.is_empty()))
            }
            Self::Summary => {
                let categories = conf.destination_categories()?;
                let store = Store::open(&conf.database)?;
                store.ensure_schema()?;
                let rows = report_ops::summary(&store, &categories)?;
                report_ops::print_summary(&rows)?;
                Ok(RunStatus::Complete)
            }
            Self::Export { filepath, category } => {
                let store = Store::open(&conf.database)?;
                store.ensure_schema()?;
                let category = category.as_deref().map(CategoryCode::from);
                export_ops::export_results(&store, filepath, category.as_ref())?;
                Ok(RunStatus::Complete)
            }
        }
    }
}

fn status_of(complete: bool) -> RunStatus {
    if complete {
        RunStatus::Complete
    } else {
        RunStatus::Incomplete
    }
}

fn init(config_file: &str, force: bool) -> Result<RunStatus, LiveabilityCliError> {
    let path = std::path::Path::new(config_file);
    if path.exists() && !force {
        return Err(LiveabilityCliError::InvalidInput(format!(
            "'{config_file}' already exists, pass --force to overwrite"
        )));
    }
    let contents = LiveabilityConfig::default_toml()?;
    std::fs::write(path, contents).map_err(|source| LiveabilityCliError::IoError {
        filepath: config_file.to_string(),
        source,
    })?;
    log::info!("wrote default configuration to {config_file}");
    Ok(RunStatus::Complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_missing_od_matrix_is_config_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let database = dir.path().join("liveability.db");
        let config_file = dir.path().join("liveability.toml");
        let contents = format!(
            r#"
database = "{}"

[oracle]
type = "od_matrix"
file = "{}"

[[categories]]
code = "supermarket"
cutoff_closest_m = 1000.0
cutoff_count_m = 1000.0
"#,
            database.display(),
            dir.path().join("missing.csv").display()
        );
        std::fs::write(&config_file, contents).expect("write config");

        let op = LiveabilityOperation::Run {
            partitions: vec![],
            fallback: false,
        };
        match op.run(&config_file.to_string_lossy()) {
            Err(e) => assert!(e.is_config_error(), "unexpected error kind: {e}"),
            Ok(status) => panic!("expected a config error, found {status:?}"),
        }
        // nothing was planned
        assert!(!database.exists());
    }
}
