mod category_code;
mod core_error;
mod destination;
mod destination_category;
mod destination_id;
pub mod distance;
mod origin_id;
mod origin_point;
mod partition_id;
mod partition_progress;
mod progress_status;
mod route_result;

pub use category_code::CategoryCode;
pub use core_error::CoreError;
pub use destination::Destination;
pub use destination_category::DestinationCategory;
pub use destination_id::DestinationId;
pub use origin_id::OriginId;
pub use origin_point::OriginPoint;
pub use partition_id::PartitionId;
pub use partition_progress::PartitionProgress;
pub use progress_status::ProgressStatus;
pub use route_result::RouteResult;
