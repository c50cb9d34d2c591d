use super::{LedgerError, WorkUnit};
use crate::model::store::schema;
use chrono::{DateTime, Utc};
use liveability_core::model::{CategoryCode, PartitionId, PartitionProgress, ProgressStatus};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashSet;

/// persisted record of work progress, one row per [`WorkUnit`]. the ledger is
/// both the run log and the recovery mechanism: a restarted run schedules
/// exactly the units that are not yet COMPLETED.
///
/// writes are must-succeed. a failed write is returned to the caller rather
/// than logged and dropped, since a lost COMPLETED row means repeated work and
/// a lost ERROR row hides a failure.
pub struct ProgressLedger<'a> {
    conn: &'a Connection,
}

impl<'a> ProgressLedger<'a> {
    pub fn new(conn: &'a Connection) -> ProgressLedger<'a> {
        ProgressLedger { conn }
    }

    /// creates the ledger table if absent.
    pub fn ensure_schema(&self) -> Result<(), LedgerError> {
        self.conn.execute_batch(schema::CREATE_PROGRESS_LEDGER)?;
        Ok(())
    }

    pub fn get(&self, unit: &WorkUnit) -> Result<Option<PartitionProgress>, LedgerError> {
        let row = self
            .conn
            .query_row(
                "SELECT partition_id, category, item_count, status, updated_at, duration_minutes
                 FROM progress_ledger WHERE partition_id = ?1 AND category = ?2",
                params![unit.partition_id.as_str(), unit.category_key()],
                read_ledger_row,
            )
            .optional()?;
        row.map(into_progress).transpose()
    }

    /// upserts the progress row for a unit. an existing row keeps its key and
    /// item count; only status, timestamp and duration are overwritten. the
    /// move from the stored status to `status` must be a valid transition,
    /// and a unit without a row counts as PENDING.
    pub fn mark(
        &self,
        unit: &WorkUnit,
        item_count: u64,
        status: ProgressStatus,
        duration_minutes: f64,
    ) -> Result<(), LedgerError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current: Option<String> = tx
            .query_row(
                "SELECT status FROM progress_ledger WHERE partition_id = ?1 AND category = ?2",
                params![unit.partition_id.as_str(), unit.category_key()],
                |row| row.get(0),
            )
            .optional()?;
        let current = match current {
            Some(stored) => stored.parse::<ProgressStatus>()?,
            None => ProgressStatus::Pending,
        };
        if !current.can_transition_to(&status) {
            return Err(LedgerError::InvalidTransition(
                unit.to_string(),
                current,
                status,
            ));
        }
        tx.execute(
            "INSERT INTO progress_ledger
                (partition_id, category, item_count, status, updated_at, duration_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(partition_id, category) DO UPDATE SET
                status = excluded.status,
                updated_at = excluded.updated_at,
                duration_minutes = excluded.duration_minutes",
            params![
                unit.partition_id.as_str(),
                unit.category_key(),
                item_count as i64,
                status.as_str(),
                Utc::now().to_rfc3339(),
                duration_minutes
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// records a PENDING row for a unit that has no ledger row yet. returns
    /// true if a row was created.
    pub fn register_pending(&self, unit: &WorkUnit, item_count: u64) -> Result<bool, LedgerError> {
        let inserted = self.conn.execute(
            "INSERT INTO progress_ledger
                (partition_id, category, item_count, status, updated_at, duration_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)
             ON CONFLICT(partition_id, category) DO NOTHING",
            params![
                unit.partition_id.as_str(),
                unit.category_key(),
                item_count as i64,
                ProgressStatus::Pending.as_str(),
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(inserted > 0)
    }

    /// `all_partitions` minus those whose ledger row for `category` is
    /// COMPLETED, in the order given.
    pub fn pending_partitions(
        &self,
        all_partitions: &[PartitionId],
        category: Option<&CategoryCode>,
    ) -> Result<Vec<PartitionId>, LedgerError> {
        let category_key = category.map(|c| c.as_str()).unwrap_or("");
        let mut stmt = self.conn.prepare(
            "SELECT partition_id FROM progress_ledger WHERE category = ?1 AND status = ?2",
        )?;
        let completed = stmt
            .query_map(
                params![category_key, ProgressStatus::Completed.as_str()],
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<HashSet<_>, _>>()?;
        let pending = all_partitions
            .iter()
            .filter(|p| !completed.contains(p.as_str()))
            .cloned()
            .collect();
        Ok(pending)
    }

    pub fn with_status(&self, status: ProgressStatus) -> Result<Vec<PartitionProgress>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT partition_id, category, item_count, status, updated_at, duration_minutes
             FROM progress_ledger WHERE status = ?1 ORDER BY partition_id, category",
        )?;
        let rows = stmt
            .query_map(params![status.as_str()], read_ledger_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_progress).collect()
    }

    /// number of ledger rows in each status.
    pub fn status_counts(&self) -> Result<Vec<(ProgressStatus, u64)>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare("SELECT count(*) FROM progress_ledger WHERE status = ?1")?;
        ProgressStatus::ALL
            .iter()
            .map(|status| {
                let n: i64 = stmt.query_row(params![status.as_str()], |row| row.get(0))?;
                Ok::<_, LedgerError>((*status, n as u64))
            })
            .collect()
    }
}

type LedgerRow = (String, String, i64, String, String, f64);

fn read_ledger_row(row: &Row<'_>) -> rusqlite::Result<LedgerRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_progress(row: LedgerRow) -> Result<PartitionProgress, LedgerError> {
    let (partition, category, item_count, status, updated_at, duration_minutes) = row;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at)
        .map_err(|e| LedgerError::InvalidRow(partition.clone(), format!("bad timestamp: {e}")))?
        .with_timezone(&Utc);
    let category = if category.is_empty() {
        None
    } else {
        Some(CategoryCode(category))
    };
    Ok(PartitionProgress {
        partition_id: PartitionId(partition),
        category,
        item_count: item_count.max(0) as u64,
        status: status.parse()?,
        updated_at,
        duration_minutes,
    })
}
