use std::path::PathBuf;

/// One CLI invocation. Every command loads `data` (NDJSON) into the configured
/// default namespace before running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Find {
        data: PathBuf,
        filter_json: String,
        project: Option<String>,
        sort: Option<String>,
        limit: Option<usize>,
        skip: Option<usize>,
    },
    Count {
        data: PathBuf,
        filter_json: String,
    },
    Update {
        data: PathBuf,
        filter_json: String,
        update_json: String,
        one: bool,
        /// Rewrite `data` with the updated documents.
        write: bool,
    },
    Delete {
        data: PathBuf,
        filter_json: String,
        one: bool,
        write: bool,
    },
    Aggregate {
        data: PathBuf,
        pipeline_json: String,
        /// Save an `$out` result as `<out>.ndjson` beside `data`.
        write: bool,
    },
}
