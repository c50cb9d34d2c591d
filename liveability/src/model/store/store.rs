use super::{schema, StoreError};
use crate::model::{accumulator::ResultAccumulator, ledger::ProgressLedger};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// how long a connection waits on a lock held by another worker before
/// giving up with `SQLITE_BUSY`.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(60);

/// the relational store shared by every worker. each worker opens its own
/// [`Store`] on the same database file; SQLite serializes their writes.
pub struct Store {
    conn: Connection,
    name: String,
}

impl Store {
    pub fn open(path: &str) -> Result<Store, StoreError> {
        let conn = Connection::open(Path::new(path))
            .map_err(|e| StoreError::OpenError(path.to_string(), e))?;
        let store = Store {
            conn,
            name: path.to_string(),
        };
        store.configure()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Store, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::OpenError(String::from(":memory:"), e))?;
        let store = Store {
            conn,
            name: String::from(":memory:"),
        };
        store.configure()?;
        Ok(store)
    }

    fn configure(&self) -> Result<(), StoreError> {
        let mode: String =
            self.conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::debug!("opened {} with journal_mode={}", self.name, mode);
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// creates any missing tables. never drops or alters existing ones.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        for ddl in schema::ALL_TABLES {
            self.conn.execute_batch(ddl)?;
        }
        Ok(())
    }

    /// builds the secondary indexes and refreshes planner statistics. run at
    /// the end of a pass, after the bulk of the writes.
    pub fn finalize(&self) -> Result<(), StoreError> {
        log::info!("creating indexes and analyzing {}", self.name);
        self.conn.execute_batch(schema::CREATE_INDEXES)?;
        self.conn.execute_batch("ANALYZE;")?;
        Ok(())
    }

    pub fn ledger(&self) -> ProgressLedger<'_> {
        ProgressLedger::new(&self.conn)
    }

    pub fn accumulator(&self, batch_size: usize) -> ResultAccumulator<'_> {
        ResultAccumulator::new(&self.conn, batch_size)
    }
}
