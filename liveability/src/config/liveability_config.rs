use super::{CategoryRow, ConfigError, StudyRegion};
use crate::model::{
    driver::{ResumableDriver, DEFAULT_WORKERS},
    oracle::{OracleConfig, OracleError, RoutingOracle},
    partition::{PartitionMethod, WorkPartitioner},
};
use liveability_core::model::DestinationCategory;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path, sync::Arc, time::Duration};

/// environment variables with this prefix override file values, with `__`
/// separating nested keys, e.g. `LIVEABILITY__WORKERS=8`.
pub const ENV_PREFIX: &str = "LIVEABILITY";

/// the whole configuration of a pipeline run. built once at startup and
/// passed by reference to everything that needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveabilityConfig {
    /// path to the SQLite database file
    pub database: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// origins per oracle call
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_region_file: Option<String>,
    /// assigns partitions on import; without it the origins CSV must carry a
    /// `partition_id` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionMethod>,
    /// run the per-origin fallback pass after every coarse pass
    #[serde(default)]
    pub fallback: bool,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_chunk_size() -> usize {
    WorkPartitioner::DEFAULT_CHUNK_SIZE
}

impl Default for LiveabilityConfig {
    fn default() -> Self {
        LiveabilityConfig {
            database: String::from("liveability.db"),
            workers: default_workers(),
            chunk_size: default_chunk_size(),
            oracle_timeout_secs: Some(600),
            oracle: OracleConfig::default(),
            categories_file: Some(String::from("categories.csv")),
            categories: vec![],
            study_region_file: None,
            partition: Some(PartitionMethod::H3 { resolution: 8 }),
            fallback: false,
        }
    }
}

impl LiveabilityConfig {
    /// reads a TOML or JSON file (by extension), applies environment
    /// overrides, and validates the result.
    pub fn from_file(filepath: &str) -> Result<LiveabilityConfig, ConfigError> {
        let config = ::config::Config::builder()
            .add_source(::config::File::from(Path::new(filepath)))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::ConfigReadError {
                msg: format!("failed reading '{filepath}'"),
                source: e,
            })?;
        let conf = config
            .try_deserialize::<LiveabilityConfig>()
            .map_err(|e| ConfigError::ConfigReadError {
                msg: format!("failed deserializing '{filepath}'"),
                source: e,
            })?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::Invalid(String::from("database path is empty")));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid(String::from("workers must be positive")));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid(String::from("chunk_size must be positive")));
        }
        if self.oracle_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(String::from(
                "oracle_timeout_secs must be positive when set",
            )));
        }
        self.oracle.validate().map_err(ConfigError::Invalid)?;
        if let Some(partition) = &self.partition {
            partition.validate()?;
        }
        if self.categories_file.is_none() && self.categories.is_empty() {
            return Err(ConfigError::Invalid(String::from(
                "no destination categories: set categories_file or categories",
            )));
        }
        Ok(())
    }

    pub fn oracle_timeout(&self) -> Option<Duration> {
        self.oracle_timeout_secs.map(Duration::from_secs)
    }

    /// the destination categories from `categories_file` followed by any
    /// given inline. there must be at least one, codes must be unique and
    /// every category must be valid.
    pub fn destination_categories(&self) -> Result<Vec<DestinationCategory>, ConfigError> {
        let mut rows = vec![];
        if let Some(filepath) = &self.categories_file {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .trim(csv::Trim::All)
                .from_path(filepath)
                .map_err(|source| ConfigError::CsvError {
                    filepath: filepath.clone(),
                    source,
                })?;
            for row in reader.deserialize::<CategoryRow>() {
                rows.push(row.map_err(|source| ConfigError::CsvError {
                    filepath: filepath.clone(),
                    source,
                })?);
            }
        }
        rows.extend(self.categories.iter().cloned());

        if rows.is_empty() {
            return Err(ConfigError::Invalid(String::from(
                "no destination categories configured",
            )));
        }
        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let category = DestinationCategory::from(row);
            category.validate()?;
            if !seen.insert(category.code.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "destination category '{}' is defined more than once",
                    category.code
                )));
            }
            categories.push(category);
        }
        log::info!("loaded {} destination categories", categories.len());
        Ok(categories)
    }

    pub fn study_region(&self) -> Result<Option<StudyRegion>, ConfigError> {
        self.study_region_file
            .as_deref()
            .map(StudyRegion::from_file)
            .transpose()
    }

    /// a driver for this configuration. categories and the oracle backend
    /// are loaded here so that a bad category, a missing OD matrix or an
    /// unknown routing program fails before any work starts. the backend is
    /// loaded once and its session shared by every worker.
    pub fn build_driver(&self) -> Result<ResumableDriver, ConfigError> {
        let categories = self.destination_categories()?;
        let session = self.oracle.build_session(self.oracle_timeout())?;
        log::info!("routing oracle {}", session.name());
        let builder = move || -> Result<Arc<dyn RoutingOracle>, OracleError> { Ok(session.clone()) };
        let driver_timeout = if self.oracle.enforces_timeout() {
            None
        } else {
            self.oracle_timeout()
        };
        let driver = ResumableDriver::new(&self.database, Arc::new(builder), categories)
            .with_workers(self.workers)
            .with_chunk_size(self.chunk_size)
            .with_oracle_timeout(driver_timeout);
        Ok(driver)
    }

    /// the default configuration as pretty-printed TOML.
    pub fn default_toml() -> Result<String, ConfigError> {
        toml::to_string_pretty(&LiveabilityConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_loads_toml_with_inline_categories() {
        let file = write_file(
            ".toml",
            r#"
database = "test.db"
workers = 2

[oracle]
type = "haversine"
circuity = 1.25

[partition]
type = "h3"
resolution = 9

[[categories]]
code = "supermarket"
name = "Supermarket"
domain = "food"
cutoff_closest_m = 1000.0
cutoff_count_m = 1600.0
"#,
        );
        let conf = LiveabilityConfig::from_file(&file.path().to_string_lossy()).expect("load");
        assert_eq!(conf.workers, 2);
        assert_eq!(conf.chunk_size, WorkPartitioner::DEFAULT_CHUNK_SIZE);
        assert_eq!(conf.partition, Some(PartitionMethod::H3 { resolution: 9 }));
        let categories = conf.destination_categories().expect("categories");
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].source_tags(), vec![String::from("supermarket")]);
    }

    #[test]
    fn test_categories_csv_and_duplicate_codes() {
        let csv = write_file(
            ".csv",
            "code,name,domain,cutoff_closest_m,cutoff_count_m,sources\n\
             supermarket,Supermarket,food,1000,1600,supermarket_osm;supermarket_gnaf\n\
             convenience,Convenience,food,1000,1000,\n",
        );
        let mut conf = LiveabilityConfig {
            categories_file: Some(csv.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        let categories = conf.destination_categories().expect("categories");
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].sources.len(), 2);

        conf.categories.push(CategoryRow {
            code: String::from("convenience"),
            name: String::new(),
            domain: String::new(),
            cutoff_closest_m: 500.0,
            cutoff_count_m: 500.0,
            sources: String::new(),
        });
        assert!(conf.destination_categories().is_err());
    }

    #[test]
    fn test_rejects_non_positive_cutoff() {
        let conf = LiveabilityConfig {
            categories_file: None,
            categories: vec![CategoryRow {
                code: String::from("park"),
                name: String::new(),
                domain: String::new(),
                cutoff_closest_m: -1.0,
                cutoff_count_m: 500.0,
                sources: String::new(),
            }],
            ..Default::default()
        };
        assert!(conf.validate().is_ok());
        assert!(conf.build_driver().is_err());
    }

    #[test]
    fn test_missing_od_matrix_fails_driver_build() {
        let conf = LiveabilityConfig {
            categories_file: None,
            categories: vec![CategoryRow {
                code: String::from("park"),
                name: String::new(),
                domain: String::new(),
                cutoff_closest_m: 500.0,
                cutoff_count_m: 500.0,
                sources: String::new(),
            }],
            oracle: OracleConfig::OdMatrix {
                file: String::from("/nonexistent/od_matrix.csv"),
            },
            ..Default::default()
        };
        assert!(conf.validate().is_ok());
        assert!(matches!(
            conf.build_driver(),
            Err(ConfigError::InvalidOracle { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let conf = LiveabilityConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(conf.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_toml_parses_back() {
        let text = LiveabilityConfig::default_toml().expect("serialize");
        let parsed: LiveabilityConfig = toml::from_str(&text).expect("parse");
        assert_eq!(parsed, LiveabilityConfig::default());
    }
}
