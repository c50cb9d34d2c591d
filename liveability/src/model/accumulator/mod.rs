mod accumulator_error;
pub mod indicator_ops;
mod result_accumulator;

pub use accumulator_error::AccumulatorError;
pub use result_accumulator::{ResultAccumulator, DEFAULT_BATCH_SIZE};
