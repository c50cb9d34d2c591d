use super::{Store, StoreError};
use liveability_core::model::{Destination, DestinationCategory, DestinationId};
use rusqlite::{params, Transaction, TransactionBehavior};

impl Store {
    pub fn upsert_destinations(&self, destinations: &[Destination]) -> Result<usize, StoreError> {
        let tx = Transaction::new_unchecked(self.connection(), TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO destinations (destination_id, source, x, y)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(destination_id) DO UPDATE SET
                    source = excluded.source,
                    x = excluded.x,
                    y = excluded.y",
            )?;
            for d in destinations.iter() {
                stmt.execute(params![
                    d.id.as_str(),
                    d.source,
                    d.coordinate.x(),
                    d.coordinate.y()
                ])?;
            }
        }
        tx.commit()?;
        Ok(destinations.len())
    }

    /// every destination read from one of the category's source datasets.
    pub fn destinations_for(
        &self,
        category: &DestinationCategory,
    ) -> Result<Vec<Destination>, StoreError> {
        let mut stmt = self.connection().prepare(
            "SELECT destination_id, source, x, y FROM destinations
             WHERE source = ?1 ORDER BY destination_id",
        )?;
        let mut result = vec![];
        for source in category.source_tags() {
            let rows = stmt.query_map(params![source], |row| {
                Ok(Destination {
                    id: DestinationId(row.get(0)?),
                    source: row.get(1)?,
                    coordinate: geo::Point::new(row.get(2)?, row.get(3)?),
                })
            })?;
            for row in rows {
                result.push(row?);
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::store::Store;
    use liveability_core::model::{
        distance::from_meters, CategoryCode, Destination, DestinationCategory, DestinationId,
    };

    fn destination(id: &str, source: &str) -> Destination {
        Destination {
            id: DestinationId::from(id),
            source: source.to_string(),
            coordinate: geo::Point::new(151.2, -33.87),
        }
    }

    #[test]
    fn test_destinations_for_combines_sources() {
        let store = Store::open_in_memory().expect("open");
        store.ensure_schema().expect("schema");
        store
            .upsert_destinations(&[
                destination("d1", "convenience_osm"),
                destination("d2", "petrol_station"),
                destination("d3", "supermarket"),
            ])
            .expect("insert");
        let category = DestinationCategory {
            code: CategoryCode::from("convenience"),
            name: String::from("Convenience"),
            domain: String::from("food"),
            cutoff_closest: from_meters(1000.0),
            cutoff_count: from_meters(1600.0),
            sources: vec![String::from("convenience_osm"), String::from("petrol_station")],
        };
        let found = store.destinations_for(&category).expect("query");
        let ids = found.iter().map(|d| d.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["d1", "d2"]);
    }
}
