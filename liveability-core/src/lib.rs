//! Data model shared by the liveability indicator pipeline: origins,
//! destinations, destination categories, routing results and the progress
//! records used to resume interrupted runs.
pub mod model;
