//! Aggregation pipelines: `$match`, `$limit`, `$skip`, `$sort`, `$project` and `$out`.
//!
//! Other recognised stage names are accepted and pass documents through unchanged;
//! an unrecognised `$` name is rejected when the pipeline is parsed.

use crate::errors::DbError;
use crate::path;
use crate::query::{self, Filter, MAX_SORT_FIELDS, Order, SortSpec};
use bson::{Bson, Document};

/// Stage names recognised without being evaluated.
pub const PASSTHROUGH_STAGES: &[&str] = &[
    "$addFields",
    "$bucket",
    "$bucketAuto",
    "$collStats",
    "$count",
    "$facet",
    "$geoNear",
    "$graphLookup",
    "$group",
    "$indexStats",
    "$listSessions",
    "$lookup",
    "$merge",
    "$planCacheStats",
    "$redact",
    "$replaceRoot",
    "$replaceWith",
    "$sample",
    "$search",
    "$set",
    "$sortByCount",
    "$unionWith",
    "$unset",
    "$unwind",
];

#[derive(Debug, Clone)]
pub enum Stage {
    Match(Filter),
    Limit(usize),
    Skip(usize),
    Sort(Vec<SortSpec>),
    Project(Document),
    Out(String),
    Passthrough(String),
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

/// Pipeline result plus the `$out` target, if a stage named one. Routing the
/// documents into that collection is left to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOutput {
    pub documents: Vec<Document>,
    pub out: Option<String>,
}

impl Pipeline {
    /// # Errors
    /// `UnknownOperator` for unrecognised stage names; `QueryError` for malformed
    /// stage arguments; any error from compiling a `$match` filter.
    pub fn parse(stages: &[Document]) -> Result<Self, DbError> {
        let stages = stages.iter().map(parse_stage).collect::<Result<Vec<_>, _>>()?;
        log::debug!("compiled pipeline with {} stage(s)", stages.len());
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Target collection of the last `$out` stage.
    pub fn out_target(&self) -> Option<&str> {
        self.stages.iter().rev().find_map(|s| match s {
            Stage::Out(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Runs the stages in order over `input`.
    pub fn run<'a, I>(&'a self, input: I) -> AggregateOutput
    where
        I: IntoIterator<Item = Document>,
        I::IntoIter: 'a,
    {
        let mut docs: Box<dyn Iterator<Item = Document> + 'a> = Box::new(input.into_iter());
        let mut out = None;
        for stage in &self.stages {
            docs = match stage {
                Stage::Match(f) => Box::new(docs.filter(move |d| query::eval_filter(d, f))),
                Stage::Limit(n) => Box::new(docs.take(*n)),
                Stage::Skip(n) => Box::new(docs.skip(*n)),
                Stage::Sort(spec) => {
                    let mut all: Vec<Document> = docs.collect();
                    all.sort_by(|a, b| query::compare_docs(a, b, spec));
                    Box::new(all.into_iter())
                }
                Stage::Project(spec) => Box::new(docs.map(move |d| project(&d, spec))),
                Stage::Out(name) => {
                    out = Some(name.clone());
                    docs
                }
                Stage::Passthrough(name) => {
                    log::warn!("pipeline stage {name} is not evaluated; documents pass through");
                    docs
                }
            };
        }
        AggregateOutput { documents: docs.collect(), out }
    }
}

fn parse_stage(stage: &Document) -> Result<Stage, DbError> {
    let mut entries = stage.iter();
    let (Some((name, arg)), None) = (entries.next(), entries.next()) else {
        return Err(DbError::QueryError(format!("a stage needs exactly one key, got {stage}")));
    };
    Ok(match name.as_str() {
        "$match" => Stage::Match(query::compile_filter(as_doc(name, arg)?)?),
        "$limit" => Stage::Limit(as_count(name, arg)?),
        "$skip" => Stage::Skip(as_count(name, arg)?),
        "$sort" => Stage::Sort(sort_spec(as_doc(name, arg)?)?),
        "$project" => Stage::Project(as_doc(name, arg)?.clone()),
        "$out" => Stage::Out(match arg {
            Bson::String(s) => s.clone(),
            Bson::Document(d) => d
                .get_str("coll")
                .map_err(|_| DbError::QueryError("$out document needs a 'coll' string".into()))?
                .to_string(),
            other => return Err(DbError::QueryError(format!("$out needs a name, got {other}"))),
        }),
        known if PASSTHROUGH_STAGES.contains(&known) => Stage::Passthrough(known.to_string()),
        unknown => return Err(DbError::UnknownOperator(unknown.to_string())),
    })
}

fn as_doc<'a>(name: &str, arg: &'a Bson) -> Result<&'a Document, DbError> {
    match arg {
        Bson::Document(d) => Ok(d),
        other => Err(DbError::QueryError(format!("{name} needs a document, got {other}"))),
    }
}

fn as_count(name: &str, arg: &Bson) -> Result<usize, DbError> {
    let n = match arg {
        Bson::Int32(i) => i64::from(*i),
        Bson::Int64(i) => *i,
        #[allow(clippy::cast_possible_truncation)]
        Bson::Double(f) if f.fract() == 0.0 => *f as i64,
        other => return Err(DbError::QueryError(format!("{name} needs an integer, got {other}"))),
    };
    usize::try_from(n).map_err(|_| DbError::QueryError(format!("{name} must not be negative")))
}

fn sort_spec(spec: &Document) -> Result<Vec<SortSpec>, DbError> {
    if spec.is_empty() {
        return Err(DbError::QueryError("$sort needs at least one field".into()));
    }
    if spec.len() > MAX_SORT_FIELDS {
        return Err(DbError::QueryError(format!("$sort takes at most {MAX_SORT_FIELDS} fields")));
    }
    spec.iter()
        .map(|(field, dir)| {
            let order = match crate::value::as_f64(dir) {
                Some(x) if x > 0.0 => Order::Asc,
                Some(x) if x < 0.0 => Order::Desc,
                _ => {
                    return Err(DbError::QueryError(format!("$sort direction for {field} must be 1 or -1")));
                }
            };
            Ok(SortSpec { field: field.clone(), order })
        })
        .collect()
}

/// Builds the projected document: `"$path"` strings are looked up in the source
/// (and left out when absent), every other value is copied as a literal.
fn project(src: &Document, spec: &Document) -> Document {
    let mut out = Document::new();
    for (key, value) in spec {
        match value {
            Bson::String(s) if s.len() > 1 && s.starts_with('$') => {
                if let Some(v) = path::first_value(src, &s[1..]) {
                    out.insert(key.clone(), v.clone());
                }
            }
            literal => {
                out.insert(key.clone(), literal.clone());
            }
        }
    }
    out
}

/// Parses a JSON array of stage documents.
pub fn parse_pipeline_json(s: &str) -> Result<Pipeline, DbError> {
    let stages: Vec<Document> = serde_json::from_str(s)?;
    Pipeline::parse(&stages)
}

/// Parses and runs a pipeline in one step.
pub fn run_pipeline<I>(stages: &[Document], input: I) -> Result<AggregateOutput, DbError>
where
    I: IntoIterator<Item = Document>,
    I::IntoIter: 'static,
{
    Ok(Pipeline::parse(stages)?.run(input))
}
