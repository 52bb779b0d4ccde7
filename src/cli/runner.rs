use crate::aggregate;
use crate::config::AppConfig;
use crate::engine::Engine;
use crate::errors::DbError;
use crate::query::{self, FindOptions};
use crate::types::Namespace;
use crate::utils::json::{read_ndjson, write_ndjson, write_ndjson_to};
use std::io::Write;
use std::path::Path;

use super::command::Command;
use super::util::{parse_projection, parse_sort};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// Reports as JSON objects.
    Json,
    /// Reports as `key=value` pairs.
    Plain,
}

/// Runs `cmd` with JSON reports.
pub fn run(cmd: Command, cfg: &AppConfig, out: &mut dyn Write) -> Result<(), DbError> {
    run_with_format(cmd, cfg, OutputMode::Json, out)
}

fn load(engine: &Engine, ns: &Namespace, data: &Path) -> Result<(), DbError> {
    let docs = read_ndjson(data)?;
    let n = engine.get_or_create(ns).insert_many(docs);
    log::debug!("loaded {n} document(s) from {} into {ns}", data.display());
    Ok(())
}

fn save(engine: &Engine, ns: &Namespace, data: &Path) -> Result<(), DbError> {
    let docs = engine.get_or_create(ns).snapshot();
    write_ndjson(data, &docs)?;
    log::info!("wrote {} document(s) to {}", docs.len(), data.display());
    Ok(())
}

fn report(out: &mut dyn Write, mode: OutputMode, pairs: &[(&str, u64)]) -> Result<(), DbError> {
    match mode {
        OutputMode::Json => {
            let obj: serde_json::Map<String, serde_json::Value> =
                pairs.iter().map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v))).collect();
            writeln!(out, "{}", serde_json::Value::Object(obj))?;
        }
        OutputMode::Plain => {
            let line: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
    }
    Ok(())
}

pub fn run_with_format(
    cmd: Command,
    cfg: &AppConfig,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<(), DbError> {
    let engine = Engine::new();
    let ns = Namespace::new(cfg.database(), cfg.collection());
    match cmd {
        Command::Find { data, filter_json, project, sort, limit, skip } => {
            load(&engine, &ns, &data)?;
            let filter = query::parse_filter_json(&filter_json)?;
            let mut opts = FindOptions { limit, skip, ..Default::default() };
            if let Some(p) = project {
                opts.projection = Some(parse_projection(&p)?);
            }
            if let Some(s) = sort {
                let specs = parse_sort(&s)?;
                if !specs.is_empty() {
                    opts.sort = Some(specs);
                }
            }
            let cursor = query::find_docs(&engine.get_or_create(&ns), &filter, &opts);
            write_ndjson_to(out, &cursor.to_vec())
        }
        Command::Count { data, filter_json } => {
            load(&engine, &ns, &data)?;
            let filter = query::parse_filter_json(&filter_json)?;
            let n = query::count_docs(&engine.get_or_create(&ns), &filter);
            report(out, mode, &[("count", n as u64)])
        }
        Command::Update { data, filter_json, update_json, one, write } => {
            load(&engine, &ns, &data)?;
            let filter = query::parse_filter_json(&filter_json)?;
            let update = query::parse_update_json(&update_json)?;
            let col = engine.get_or_create(&ns);
            let r = if one {
                query::update_one(&col, &filter, &update)
            } else {
                query::update_many(&col, &filter, &update)
            };
            if write && r.modified > 0 {
                save(&engine, &ns, &data)?;
            }
            report(out, mode, &[("matched", r.matched), ("modified", r.modified)])
        }
        Command::Delete { data, filter_json, one, write } => {
            load(&engine, &ns, &data)?;
            let filter = query::parse_filter_json(&filter_json)?;
            let col = engine.get_or_create(&ns);
            let r = if one { query::delete_one(&col, &filter) } else { query::delete_many(&col, &filter) };
            if write && r.deleted > 0 {
                save(&engine, &ns, &data)?;
            }
            report(out, mode, &[("deleted", r.deleted)])
        }
        Command::Aggregate { data, pipeline_json, write } => {
            load(&engine, &ns, &data)?;
            let pipeline = aggregate::parse_pipeline_json(&pipeline_json)?;
            let result = engine.aggregate(&ns, &pipeline)?;
            if write && let Some(target) = &result.out {
                let dest = data.with_file_name(format!("{target}.ndjson"));
                save(&engine, &Namespace::new(ns.database.clone(), target.clone()), &dest)?;
            }
            write_ndjson_to(out, &result.documents)
        }
    }
}
