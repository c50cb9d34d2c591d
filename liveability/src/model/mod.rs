pub mod accumulator;
pub mod driver;
pub mod ledger;
pub mod oracle;
pub mod partition;
pub mod store;
