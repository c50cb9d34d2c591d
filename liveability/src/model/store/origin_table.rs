use super::{Store, StoreError};
use chrono::Utc;
use liveability_core::model::{OriginId, OriginPoint, PartitionId};
use rusqlite::{params, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

impl Store {
    /// inserts or replaces origins by id in a single transaction. returns the
    /// number of rows written.
    pub fn upsert_origins(&self, origins: &[OriginPoint]) -> Result<usize, StoreError> {
        let tx = Transaction::new_unchecked(self.connection(), TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO origins (origin_id, x, y, partition_id, areas)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(origin_id) DO UPDATE SET
                    x = excluded.x,
                    y = excluded.y,
                    partition_id = excluded.partition_id,
                    areas = excluded.areas",
            )?;
            for origin in origins.iter() {
                let areas = serde_json::to_string(&origin.areas)?;
                stmt.execute(params![
                    origin.id.as_str(),
                    origin.coordinate.x(),
                    origin.coordinate.y(),
                    origin.partition_id.as_str(),
                    areas
                ])?;
            }
        }
        tx.commit()?;
        log::debug!(
            "wrote {} origins at {}",
            origins.len(),
            Utc::now().to_rfc3339()
        );
        Ok(origins.len())
    }

    /// reads origins, optionally restricted to a set of partitions, ordered
    /// by partition then id.
    pub fn load_origins(
        &self,
        partitions: Option<&[PartitionId]>,
    ) -> Result<Vec<OriginPoint>, StoreError> {
        let mut stmt = self.connection().prepare(
            "SELECT origin_id, x, y, partition_id, areas FROM origins
             ORDER BY partition_id, origin_id",
        )?;
        let rows = stmt
            .query_map([], read_origin_row)?
            .collect::<Result<Vec<_>, _>>()?;
        let mut origins = Vec::with_capacity(rows.len());
        for (id, x, y, partition, areas) in rows {
            if let Some(filter) = partitions {
                if !filter.iter().any(|p| p.as_str() == partition) {
                    continue;
                }
            }
            let areas: BTreeMap<String, String> = serde_json::from_str(&areas)?;
            origins.push(OriginPoint {
                id: OriginId(id),
                coordinate: geo::Point::new(x, y),
                partition_id: PartitionId(partition),
                areas,
            });
        }
        Ok(origins)
    }

    pub fn count_origins(&self) -> Result<u64, StoreError> {
        let n: i64 = self
            .connection()
            .query_row("SELECT count(*) FROM origins", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

type OriginRow = (String, f64, f64, String, String);

fn read_origin_row(row: &Row<'_>) -> rusqlite::Result<OriginRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

#[cfg(test)]
mod tests {
    use crate::model::store::Store;
    use liveability_core::model::{OriginId, OriginPoint, PartitionId};

    #[test]
    fn test_upsert_and_filter_origins() {
        let store = Store::open_in_memory().expect("open");
        store.ensure_schema().expect("schema");
        let mut a = OriginPoint::new(
            OriginId::from("a"),
            geo::Point::new(144.96, -37.81),
            PartitionId::from("p1"),
        );
        a.areas.insert(String::from("sa1"), String::from("20604112202"));
        let b = OriginPoint::new(
            OriginId::from("b"),
            geo::Point::new(144.97, -37.82),
            PartitionId::from("p2"),
        );
        store.upsert_origins(&[a.clone(), b]).expect("insert");
        store.upsert_origins(&[a.clone()]).expect("re-insert");
        assert_eq!(store.count_origins().expect("count"), 2);

        let p1 = [PartitionId::from("p1")];
        let only_p1 = store.load_origins(Some(&p1)).expect("load");
        assert_eq!(only_p1, vec![a]);
    }
}
