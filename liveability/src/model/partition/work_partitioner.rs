use super::Partitions;
use itertools::Itertools;
use liveability_core::model::OriginPoint;
use std::collections::BTreeMap;

/// divides origins into the units of parallel work. partition ids are
/// assigned upstream (on import); this groups by them and bounds the size of
/// each oracle call by splitting a partition into sub-batches.
#[derive(Debug, Clone, Copy)]
pub struct WorkPartitioner {
    pub chunk_size: usize,
}

impl WorkPartitioner {
    pub const DEFAULT_CHUNK_SIZE: usize = 200;

    pub fn new(chunk_size: usize) -> WorkPartitioner {
        WorkPartitioner {
            chunk_size: chunk_size.max(1),
        }
    }

    /// groups origins by partition id. empty input yields empty partitions.
    /// within a partition origins are ordered by id.
    pub fn partition(&self, origins: Vec<OriginPoint>) -> Partitions {
        let groups: BTreeMap<_, Vec<OriginPoint>> = origins
            .into_iter()
            .into_group_map_by(|o| o.partition_id.clone())
            .into_iter()
            .map(|(k, mut v)| {
                v.sort_by(|a, b| a.id.cmp(&b.id));
                (k, v)
            })
            .collect();
        Partitions::new(groups)
    }

    /// fixed-size sub-batches of a partition's origins, the unit of one
    /// oracle call.
    pub fn sub_batches<'a>(&self, origins: &'a [OriginPoint]) -> std::slice::Chunks<'a, OriginPoint> {
        origins.chunks(self.chunk_size)
    }
}

impl Default for WorkPartitioner {
    fn default() -> Self {
        WorkPartitioner::new(WorkPartitioner::DEFAULT_CHUNK_SIZE)
    }
}
