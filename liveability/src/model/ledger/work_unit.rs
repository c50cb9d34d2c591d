use liveability_core::model::{CategoryCode, PartitionId};
use std::fmt::Display;

/// the unit the driver schedules and the ledger tracks: one partition,
/// optionally narrowed to one destination category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkUnit {
    pub partition_id: PartitionId,
    pub category: Option<CategoryCode>,
}

impl WorkUnit {
    pub fn new(partition_id: PartitionId, category: Option<CategoryCode>) -> WorkUnit {
        WorkUnit {
            partition_id,
            category,
        }
    }

    /// the ledger stores "no category" as the empty string so it can take
    /// part in the primary key.
    pub fn category_key(&self) -> &str {
        self.category.as_ref().map(|c| c.as_str()).unwrap_or("")
    }
}

impl Display for WorkUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.category {
            Some(c) => write!(f, "{}/{}", self.partition_id, c),
            None => write!(f, "{}", self.partition_id),
        }
    }
}
