//! hdi-ingest library interface
//!
//! Cleans the housing, income and geography feeds, joins them by identifier
//! and loads the result into the housing table. Exposed as a library so the
//! integration tests can drive each stage directly.

pub mod corruption;
pub mod feeds;
pub mod fields;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod repair;
pub mod store;

pub use pipeline::{run_import, ImportSummary, SourceRows};
pub use store::{RecordStore, SqliteRecordStore};
