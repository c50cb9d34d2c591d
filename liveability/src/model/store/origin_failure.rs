use chrono::{DateTime, Utc};
use liveability_core::model::{CategoryCode, OriginId, PartitionId};

/// an origin that failed on its own during the fallback pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginFailure {
    pub origin_id: OriginId,
    pub category: CategoryCode,
    pub partition_id: PartitionId,
    pub message: String,
    pub updated_at: DateTime<Utc>,
}
