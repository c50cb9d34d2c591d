//! resumable distance-to-destination indicator pipeline.
//!
//! origins are grouped into spatial partitions, each (partition, category)
//! pair is routed against its destinations by a pluggable routing oracle,
//! and the results are merged into a SQLite store alongside a progress
//! ledger that lets an interrupted run pick up where it left off.
pub mod app;
pub mod config;
pub mod model;
