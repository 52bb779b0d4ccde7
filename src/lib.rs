//! In-memory document query engine: MongoDB-style filters, update operators and
//! aggregation pipelines evaluated over BSON documents.

pub mod aggregate;
pub mod cli;
pub mod collection;
pub mod config;
pub mod engine;
pub mod errors;
pub mod path;
pub mod query;
pub mod types;
pub mod utils;
pub mod value;

pub use aggregate::{AggregateOutput, Pipeline};
pub use collection::Collection;
pub use engine::Engine;
pub use errors::DbError;
pub use types::Namespace;

/// Configures logging from `MEMDOC_*` environment variables.
///
/// Call once before other operations if file logs are wanted; without it the
/// `log` macros are no-ops.
pub fn init() -> Result<(), DbError> {
    utils::logger::configure_from_env()
}
