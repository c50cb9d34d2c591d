use super::{OriginFailure, Store, StoreError};
use chrono::{DateTime, Utc};
use liveability_core::model::{CategoryCode, OriginId, PartitionId};
use rusqlite::params;

impl Store {
    pub fn record_origin_failure(
        &self,
        origin_id: &OriginId,
        category: &CategoryCode,
        partition_id: &PartitionId,
        message: &str,
    ) -> Result<(), StoreError> {
        self.connection().execute(
            "INSERT INTO origin_failures (origin_id, category, partition_id, message, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(origin_id, category) DO UPDATE SET
                partition_id = excluded.partition_id,
                message = excluded.message,
                updated_at = excluded.updated_at",
            params![
                origin_id.as_str(),
                category.as_str(),
                partition_id.as_str(),
                message,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// removes a failure record once the origin has succeeded. returns true if
    /// a record existed.
    pub fn clear_origin_failure(
        &self,
        origin_id: &OriginId,
        category: &CategoryCode,
    ) -> Result<bool, StoreError> {
        let n = self.connection().execute(
            "DELETE FROM origin_failures WHERE origin_id = ?1 AND category = ?2",
            params![origin_id.as_str(), category.as_str()],
        )?;
        Ok(n > 0)
    }

    pub fn origin_failures(&self) -> Result<Vec<OriginFailure>, StoreError> {
        let mut stmt = self.connection().prepare(
            "SELECT origin_id, category, partition_id, message, updated_at
             FROM origin_failures ORDER BY category, partition_id, origin_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(origin_id, category, partition_id, message, updated_at)| {
                let updated_at = DateTime::parse_from_rfc3339(&updated_at)
                    .map_err(|e| StoreError::InvalidRow(String::from("origin_failures"), e.to_string()))?
                    .with_timezone(&Utc);
                Ok(OriginFailure {
                    origin_id: OriginId(origin_id),
                    category: CategoryCode(category),
                    partition_id: PartitionId(partition_id),
                    message,
                    updated_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::store::Store;
    use liveability_core::model::{CategoryCode, OriginId, PartitionId};

    #[test]
    fn test_record_then_clear() {
        let store = Store::open_in_memory().expect("open");
        store.ensure_schema().expect("schema");
        let (o, c, p) = (
            OriginId::from("C"),
            CategoryCode::from("supermarket"),
            PartitionId::from("1"),
        );
        store.record_origin_failure(&o, &c, &p, "first").expect("write");
        store.record_origin_failure(&o, &c, &p, "second").expect("rewrite");
        let failures = store.origin_failures().expect("read");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "second");
        assert!(store.clear_origin_failure(&o, &c).expect("clear"));
        assert!(store.origin_failures().expect("read").is_empty());
    }
}
