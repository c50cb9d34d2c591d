use liveability_core::model::{OriginId, OriginPoint, PartitionId};
use std::collections::BTreeMap;

/// origins grouped by partition, ordered by partition id.
#[derive(Debug, Clone, Default)]
pub struct Partitions {
    groups: BTreeMap<PartitionId, Vec<OriginPoint>>,
}

impl Partitions {
    pub fn new(groups: BTreeMap<PartitionId, Vec<OriginPoint>>) -> Partitions {
        Partitions { groups }
    }

    /// distinct partition ids in order.
    pub fn ids(&self) -> Vec<PartitionId> {
        self.groups.keys().cloned().collect()
    }

    pub fn origins(&self, partition_id: &PartitionId) -> &[OriginPoint] {
        self.groups
            .get(partition_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn origin_ids(&self, partition_id: &PartitionId) -> Vec<OriginId> {
        self.origins(partition_id)
            .iter()
            .map(|o| o.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_origins(&self) -> usize {
        self.groups.values().map(|v| v.len()).sum()
    }
}
