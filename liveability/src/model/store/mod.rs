mod destination_table;
mod failure_table;
mod origin_failure;
mod origin_table;
pub(crate) mod schema;
mod store;
mod store_error;

pub use origin_failure::OriginFailure;
pub use store::Store;
pub use store_error::StoreError;
