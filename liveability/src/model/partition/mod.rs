mod partition_error;
mod partition_method;
mod partitions;
mod work_partitioner;

pub use partition_error::PartitionError;
pub use partition_method::PartitionMethod;
pub use partitions::Partitions;
pub use work_partitioner::WorkPartitioner;
