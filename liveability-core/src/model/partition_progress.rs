use super::{CategoryCode, PartitionId, ProgressStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// one row of the progress ledger. keyed by partition, and by category when
/// work is tracked per destination category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionProgress {
    pub partition_id: PartitionId,
    pub category: Option<CategoryCode>,
    pub item_count: u64,
    pub status: ProgressStatus,
    pub updated_at: DateTime<Utc>,
    pub duration_minutes: f64,
}

impl PartitionProgress {
    /// human-readable key, e.g. `8a2a1072b59ffff/supermarket`
    pub fn key_string(&self) -> String {
        match &self.category {
            Some(c) => format!("{}/{}", self.partition_id, c),
            None => self.partition_id.to_string(),
        }
    }
}
