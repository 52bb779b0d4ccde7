//! Utility modules: NDJSON files, logging setup, per-operation trace capture.
pub mod json;
pub mod logger;
pub mod tracelog;
