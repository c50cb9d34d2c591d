//! loads origin and destination CSVs into the store. both imports are upserts
//! keyed by id, so re-importing a file is harmless.
use super::{geometry_format::get_column, GeometryFormat, LiveabilityCliError};
use crate::config::{LiveabilityConfig, StudyRegion};
use crate::model::{partition::PartitionMethod, store::Store};
use csv::StringRecord;
use kdam::tqdm;
use liveability_core::model::{Destination, DestinationId, OriginId, OriginPoint, PartitionId};
use std::collections::{BTreeMap, HashMap};

const WRITE_BATCH_SIZE: usize = 10_000;

/// column choices for an import file. any column left unset is detected from
/// the header.
#[derive(Debug, Clone, Default)]
pub struct ImportColumns {
    pub id_column: Option<String>,
    pub geometry_column: Option<String>,
    pub x_column: Option<String>,
    pub y_column: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub outside_region: usize,
}

/// imports origins. rows get their partition from the configured partition
/// method, or from a `partition_id` column when none is configured. columns
/// other than id, location and partition are kept as area linkages.
pub fn import_origins(
    conf: &LiveabilityConfig,
    filepath: &str,
    columns: &ImportColumns,
) -> Result<ImportSummary, LiveabilityCliError> {
    let region = conf.study_region()?;
    let store = Store::open(&conf.database)?;
    store.ensure_schema()?;
    let (mut reader, lookup) = open_csv(filepath)?;
    let id_column = columns.id_column.clone().unwrap_or_else(|| String::from("id"));
    let geometry_format = geometry_format(columns, &lookup)?;
    let partition_column = match conf.partition {
        Some(_) => None,
        None if lookup.contains_key("partition_id") => Some(String::from("partition_id")),
        None => {
            return Err(LiveabilityCliError::InvalidInput(format!(
                "'{filepath}' has no partition_id column and no partition method is configured"
            )))
        }
    };
    let mut reserved = geometry_format.columns();
    reserved.extend([id_column.as_str(), "partition_id"]);
    let area_columns = lookup
        .iter()
        .filter(|(name, _)| !reserved.contains(&name.as_str()))
        .map(|(name, idx)| (name.clone(), *idx))
        .collect::<Vec<_>>();
    log::info!(
        "importing origins from {} with id column '{}', geometry '{}', {} area columns",
        filepath,
        id_column,
        geometry_format,
        area_columns.len()
    );

    let mut summary = ImportSummary::default();
    let mut batch = Vec::with_capacity(WRITE_BATCH_SIZE);
    for (idx, record) in tqdm!(reader.records().enumerate(), desc = "import origins") {
        let row = record.map_err(|source| LiveabilityCliError::CsvReadError {
            filepath: filepath.to_string(),
            source,
        })?;
        let origin = read_origin(
            &row,
            &lookup,
            &id_column,
            &geometry_format,
            conf.partition.as_ref(),
            partition_column.as_deref(),
            &area_columns,
        )
        .map_err(|msg| LiveabilityCliError::InvalidRow {
            filepath: filepath.to_string(),
            row: idx,
            msg,
        })?;
        if !in_region(region.as_ref(), &origin.coordinate) {
            summary.outside_region += 1;
            continue;
        }
        batch.push(origin);
        if batch.len() >= WRITE_BATCH_SIZE {
            summary.imported += store.upsert_origins(&batch)?;
            batch.clear();
        }
    }
    eprintln!();
    summary.imported += store.upsert_origins(&batch)?;
    log::info!(
        "imported {} origins, skipped {} outside the study region",
        summary.imported,
        summary.outside_region
    );
    Ok(summary)
}

/// imports destinations. each row needs an id, a `source` tag naming the raw
/// dataset, and a location.
pub fn import_destinations(
    conf: &LiveabilityConfig,
    filepath: &str,
    columns: &ImportColumns,
) -> Result<ImportSummary, LiveabilityCliError> {
    let store = Store::open(&conf.database)?;
    store.ensure_schema()?;
    let (mut reader, lookup) = open_csv(filepath)?;
    let id_column = columns.id_column.clone().unwrap_or_else(|| String::from("id"));
    let geometry_format = geometry_format(columns, &lookup)?;

    let mut summary = ImportSummary::default();
    let mut batch = Vec::with_capacity(WRITE_BATCH_SIZE);
    for (idx, record) in tqdm!(reader.records().enumerate(), desc = "import destinations") {
        let row = record.map_err(|source| LiveabilityCliError::CsvReadError {
            filepath: filepath.to_string(),
            source,
        })?;
        let destination = read_destination(&row, &lookup, &id_column, &geometry_format)
            .map_err(|msg| LiveabilityCliError::InvalidRow {
                filepath: filepath.to_string(),
                row: idx,
                msg,
            })?;
        batch.push(destination);
        if batch.len() >= WRITE_BATCH_SIZE {
            summary.imported += store.upsert_destinations(&batch)?;
            batch.clear();
        }
    }
    eprintln!();
    summary.imported += store.upsert_destinations(&batch)?;
    log::info!("imported {} destinations from {}", summary.imported, filepath);
    Ok(summary)
}

fn open_csv(
    filepath: &str,
) -> Result<(csv::Reader<std::fs::File>, HashMap<String, usize>), LiveabilityCliError> {
    let read_error = |source| LiveabilityCliError::CsvReadError {
        filepath: filepath.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(filepath)
        .map_err(read_error)?;
    let lookup = reader
        .headers()
        .map_err(read_error)?
        .iter()
        .enumerate()
        .map(|(i, s)| (s.trim().to_string(), i))
        .collect::<HashMap<_, _>>();
    Ok((reader, lookup))
}

fn geometry_format(
    columns: &ImportColumns,
    lookup: &HashMap<String, usize>,
) -> Result<GeometryFormat, LiveabilityCliError> {
    GeometryFormat::new(
        columns.geometry_column.as_ref(),
        columns.x_column.as_ref(),
        columns.y_column.as_ref(),
        lookup,
    )
    .map_err(LiveabilityCliError::InvalidInput)
}

fn in_region(region: Option<&StudyRegion>, point: &geo::Point<f64>) -> bool {
    region.map(|r| r.contains(point)).unwrap_or(true)
}

fn read_origin(
    row: &StringRecord,
    lookup: &HashMap<String, usize>,
    id_column: &str,
    geometry_format: &GeometryFormat,
    partition_method: Option<&PartitionMethod>,
    partition_column: Option<&str>,
    area_columns: &[(String, usize)],
) -> Result<OriginPoint, String> {
    let id = get_column(row, lookup, id_column)?;
    if id.is_empty() {
        return Err(format!("empty value in column '{id_column}'"));
    }
    let coordinate = geometry_format.get_point(row, lookup)?;
    let partition_id = match (partition_method, partition_column) {
        (Some(method), _) => method.assign(&coordinate).map_err(|e| e.to_string())?,
        (None, Some(column)) => PartitionId::from(get_column(row, lookup, column)?),
        (None, None) => return Err(String::from("no way to assign a partition")),
    };
    let mut origin = OriginPoint::new(OriginId::from(id), coordinate, partition_id);
    origin.areas = area_columns
        .iter()
        .filter_map(|(name, idx)| row.get(*idx).map(|v| (name.clone(), v.trim().to_string())))
        .filter(|(_, v)| !v.is_empty())
        .collect::<BTreeMap<_, _>>();
    Ok(origin)
}

fn read_destination(
    row: &StringRecord,
    lookup: &HashMap<String, usize>,
    id_column: &str,
    geometry_format: &GeometryFormat,
) -> Result<Destination, String> {
    let id = get_column(row, lookup, id_column)?;
    let source = get_column(row, lookup, "source")?;
    if id.is_empty() || source.is_empty() {
        return Err(String::from("destination id and source must be non-empty"));
    }
    Ok(Destination {
        id: DestinationId::from(id),
        source: source.to_string(),
        coordinate: geometry_format.get_point(row, lookup)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::oracle::OracleConfig;
    use std::io::Write;

    fn conf(dir: &tempfile::TempDir, partition: Option<PartitionMethod>) -> LiveabilityConfig {
        LiveabilityConfig {
            database: dir.path().join("test.db").to_string_lossy().to_string(),
            oracle: OracleConfig::default(),
            partition,
            ..Default::default()
        }
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(contents.as_bytes()).expect("write");
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_import_origins_assigns_h3_and_keeps_areas() {
        let dir = tempfile::tempdir().expect("temp dir");
        let conf = conf(&dir, Some(PartitionMethod::H3 { resolution: 8 }));
        let path = write_csv(
            &dir,
            "origins.csv",
            "id,x,y,mb_code\nA,144.9631,-37.8136,20663975000\nB,144.9632,-37.8137,20663975000\n",
        );
        let summary = import_origins(&conf, &path, &ImportColumns::default()).expect("import");
        assert_eq!(summary.imported, 2);
        let store = Store::open(&conf.database).expect("open");
        let origins = store.load_origins(None).expect("load");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0].partition_id, origins[1].partition_id);
        assert_eq!(
            origins[0].areas.get("mb_code").map(String::as_str),
            Some("20663975000")
        );
    }

    #[test]
    fn test_import_origins_requires_partition_source() {
        let dir = tempfile::tempdir().expect("temp dir");
        let conf = conf(&dir, None);
        let path = write_csv(&dir, "origins.csv", "id,x,y\nA,144.96,-37.81\n");
        assert!(import_origins(&conf, &path, &ImportColumns::default()).is_err());

        let path = write_csv(&dir, "origins2.csv", "id,x,y,partition_id\nA,144.96,-37.81,p1\n");
        let summary = import_origins(&conf, &path, &ImportColumns::default()).expect("import");
        assert_eq!(summary.imported, 1);
    }

    #[test]
    fn test_import_destinations_from_wkt() {
        let dir = tempfile::tempdir().expect("temp dir");
        let conf = conf(&dir, None);
        let path = write_csv(
            &dir,
            "destinations.csv",
            "id,source,geometry\ns1,supermarket,POINT(144.96 -37.81)\n",
        );
        let summary =
            import_destinations(&conf, &path, &ImportColumns::default()).expect("import");
        assert_eq!(summary.imported, 1);
    }
}
