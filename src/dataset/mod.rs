//! Canonical schema, merge rules and CSV persistence

pub mod merge;
pub mod schema;
pub mod store;

pub use merge::{MergeMode, MergeStats, merge};
pub use schema::{Column, ErrataRecord, RecordKey, UnknownColumn};
pub use store::{CommitReport, CsvStore};
