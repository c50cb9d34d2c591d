use super::AccumulatorError;
use chrono::Utc;
use geo::Geometry;
use liveability_core::model::{distance, CategoryCode, OriginId, RouteResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use wkt::{ToWkt, TryFromWkt};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// upserts [`RouteResult`] rows keyed by (origin, category).
///
/// every write merges with what is already stored using [`RouteResult::merge`],
/// so re-running a unit never loses a recorded distance and never counts a
/// destination source twice. rows are written in batches, one transaction per
/// batch.
pub struct ResultAccumulator<'a> {
    conn: &'a Connection,
    batch_size: usize,
}

type StoredRow = (Option<f64>, String, Option<String>);

impl<'a> ResultAccumulator<'a> {
    pub fn new(conn: &'a Connection, batch_size: usize) -> ResultAccumulator<'a> {
        ResultAccumulator {
            conn,
            batch_size: batch_size.max(1),
        }
    }

    /// merges `results` into the store. results sharing a key are first
    /// merged with each other. returns the number of distinct keys written.
    pub fn upsert_results(&self, results: &[RouteResult]) -> Result<usize, AccumulatorError> {
        let mut merged: BTreeMap<(OriginId, CategoryCode), RouteResult> = BTreeMap::new();
        for result in results.iter() {
            let key = (result.origin_id.clone(), result.category.clone());
            match merged.get_mut(&key) {
                Some(existing) => existing.merge(result)?,
                None => {
                    merged.insert(key, result.clone());
                }
            }
        }
        let merged = merged.into_values().collect::<Vec<_>>();
        for batch in merged.chunks(self.batch_size) {
            self.upsert_batch(batch)?;
        }
        Ok(merged.len())
    }

    fn upsert_batch(&self, batch: &[RouteResult]) -> Result<(), AccumulatorError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let mut select = tx.prepare(
                "SELECT distance_m, source_counts, geometry FROM route_results
                 WHERE origin_id = ?1 AND category = ?2",
            )?;
            let mut upsert = tx.prepare(
                "INSERT INTO route_results
                    (origin_id, category, distance_m, count, source_counts, geometry, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(origin_id, category) DO UPDATE SET
                    distance_m = excluded.distance_m,
                    count = excluded.count,
                    source_counts = excluded.source_counts,
                    geometry = excluded.geometry,
                    updated_at = excluded.updated_at",
            )?;
            let now = Utc::now().to_rfc3339();
            for incoming in batch.iter() {
                let stored: Option<StoredRow> = select
                    .query_row(
                        params![incoming.origin_id.as_str(), incoming.category.as_str()],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .optional()?;
                let result = match stored {
                    Some(row) => {
                        let mut existing = decode_row(
                            incoming.origin_id.clone(),
                            incoming.category.clone(),
                            row,
                        )?;
                        existing.merge(incoming)?;
                        existing
                    }
                    None => incoming.clone(),
                };
                upsert.execute(params![
                    result.origin_id.as_str(),
                    result.category.as_str(),
                    result.distance_meters(),
                    result.count() as i64,
                    serde_json::to_string(&result.source_counts)?,
                    result.geometry.as_ref().map(|g| g.wkt_string()),
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get(
        &self,
        origin_id: &OriginId,
        category: &CategoryCode,
    ) -> Result<Option<RouteResult>, AccumulatorError> {
        let row: Option<StoredRow> = self
            .conn
            .query_row(
                "SELECT distance_m, source_counts, geometry FROM route_results
                 WHERE origin_id = ?1 AND category = ?2",
                params![origin_id.as_str(), category.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        row.map(|r| decode_row(origin_id.clone(), category.clone(), r))
            .transpose()
    }

    /// all stored results, optionally for a single category, ordered by
    /// category then origin.
    pub fn load_results(
        &self,
        category: Option<&CategoryCode>,
    ) -> Result<Vec<RouteResult>, AccumulatorError> {
        let mut stmt = self.conn.prepare(
            "SELECT origin_id, category, distance_m, source_counts, geometry FROM route_results
             WHERE ?1 IS NULL OR category = ?1
             ORDER BY category, origin_id",
        )?;
        let rows = stmt
            .query_map(params![category.map(|c| c.as_str())], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    (row.get(2)?, row.get(3)?, row.get(4)?),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(o, c, r)| decode_row(OriginId(o), CategoryCode(c), r))
            .collect()
    }

    /// per category, the number of origins with a recorded distance and the
    /// number searched with nothing found.
    pub fn completeness(&self) -> Result<BTreeMap<CategoryCode, (u64, u64)>, AccumulatorError> {
        let mut stmt = self.conn.prepare(
            "SELECT category,
                    sum(CASE WHEN distance_m IS NOT NULL THEN 1 ELSE 0 END),
                    sum(CASE WHEN distance_m IS NULL THEN 1 ELSE 0 END)
             FROM route_results GROUP BY category",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    CategoryCode(row.get(0)?),
                    (row.get::<_, i64>(1)? as u64, row.get::<_, i64>(2)? as u64),
                ))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(rows)
    }
}

fn decode_row(
    origin_id: OriginId,
    category: CategoryCode,
    (distance_m, source_counts, geometry): StoredRow,
) -> Result<RouteResult, AccumulatorError> {
    let source_counts: BTreeMap<String, u64> = serde_json::from_str(&source_counts)?;
    let geometry = match geometry {
        None => None,
        Some(text) => Some(Geometry::try_from_wkt_str(&text).map_err(|e| {
            AccumulatorError::InvalidRow(format!("{origin_id}/{category}"), e.to_string())
        })?),
    };
    Ok(RouteResult {
        origin_id,
        category,
        distance: distance_m.map(distance::from_meters),
        source_counts,
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use geo::line_string;
    use crate::model::store::Store;
    use liveability_core::model::{distance::from_meters, CategoryCode, OriginId, RouteResult};

    fn store() -> Store {
        let store = Store::open_in_memory().expect("open");
        store.ensure_schema().expect("schema");
        store
    }

    fn result(o: &str, distance: Option<f64>) -> RouteResult {
        let origin = OriginId::from(o);
        let category = CategoryCode::from("supermarket");
        match distance {
            Some(d) => RouteResult::found(origin, category, from_meters(d)),
            None => RouteResult::not_found(origin, category),
        }
    }

    #[test]
    fn test_stored_distance_survives_null_rerun() {
        let store = store();
        let acc = store.accumulator(10);
        acc.upsert_results(&[result("A", Some(500.0)), result("B", None)])
            .expect("first write");
        acc.upsert_results(&[result("A", None), result("B", None)])
            .expect("second write");
        let a = acc
            .get(&OriginId::from("A"), &CategoryCode::from("supermarket"))
            .expect("read")
            .expect("row exists");
        assert_eq!(a.distance_meters(), Some(500.0));
        let b = acc
            .get(&OriginId::from("B"), &CategoryCode::from("supermarket"))
            .expect("read")
            .expect("row exists");
        assert_eq!(b.distance_meters(), None);
    }

    #[test]
    fn test_shorter_distance_replaces_longer() {
        let store = store();
        let acc = store.accumulator(10);
        acc.upsert_results(&[result("A", Some(900.0))]).expect("write");
        acc.upsert_results(&[result("A", Some(400.0))]).expect("write");
        acc.upsert_results(&[result("A", Some(650.0))]).expect("write");
        let rows = acc.load_results(None).expect("load");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].distance_meters(), Some(400.0));
    }

    #[test]
    fn test_counts_from_two_sources_add_and_repeat_is_idempotent() {
        let store = store();
        let acc = store.accumulator(1);
        let osm = result("A", Some(300.0)).with_count("osm", 3);
        let gnaf = result("A", Some(450.0)).with_count("gnaf", 2);
        acc.upsert_results(&[osm.clone()]).expect("write");
        acc.upsert_results(&[gnaf.clone()]).expect("write");
        acc.upsert_results(&[osm, gnaf]).expect("rewrite");
        let a = acc
            .get(&OriginId::from("A"), &CategoryCode::from("supermarket"))
            .expect("read")
            .expect("row exists");
        assert_eq!(a.count(), 5);
        assert_eq!(a.distance_meters(), Some(300.0));
        let stored_count: i64 = store
            .connection()
            .query_row("SELECT count FROM route_results WHERE origin_id = 'A'", [], |r| r.get(0))
            .expect("query");
        assert_eq!(stored_count, 5);
    }

    #[test]
    fn test_geometry_round_trips_through_store() {
        let store = store();
        let acc = store.accumulator(10);
        let mut r = result("A", Some(120.0));
        r.geometry = Some(geo::Geometry::LineString(geo::line_string![
            (x: 144.96, y: -37.81),
            (x: 144.97, y: -37.82)
        ]));
        acc.upsert_results(&[r.clone()]).expect("write");
        let stored = acc
            .get(&r.origin_id, &r.category)
            .expect("read")
            .expect("row exists");
        assert!(stored.geometry.is_some());
        acc.upsert_results(&[result("B", None)]).expect("write");
        let counts = acc.completeness().expect("counts");
        assert_eq!(counts.get(&CategoryCode::from("supermarket")), Some(&(1, 1)));
    }
}
