use crate::errors::DbError;
use crate::value::BsonKind;
use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};

use super::types::{
    CmpOp, Cond, Filter, InItem, MAX_FILTER_DEPTH, MAX_IN_SET, PullMatcher, UpdateDoc, UpdateOp,
};

/// What the `$`-operators of a filter document apply to.
#[derive(Clone, Copy)]
enum Ctx<'a> {
    /// Top of a collection filter: only logical operators and field keys.
    Root,
    /// The subject value itself (array element, `$pull` candidate).
    Value,
    /// The member named by a field key.
    Field(&'a str),
}

impl Ctx<'_> {
    fn operand_path(self, op: &str) -> Result<Option<String>, DbError> {
        match self {
            Ctx::Root => Err(DbError::UnknownOperator(op.to_string())),
            Ctx::Value => Ok(None),
            Ctx::Field(p) => Ok(Some(p.to_string())),
        }
    }
}

fn ctx_of(path: Option<&str>) -> Ctx<'_> {
    path.map_or(Ctx::Value, Ctx::Field)
}

/// Compiles a collection filter document.
///
/// # Errors
/// `UnknownOperator` for unrecognised `$` keys, `UnsupportedBsonType` for bad `$type`
/// operands, `InvalidRegex` for patterns that do not compile, and `QueryError` for
/// malformed operands.
pub fn compile_filter(doc: &Document) -> Result<Filter, DbError> {
    let f = compile_clauses(doc, Ctx::Root, 0)?;
    log::debug!("compiled filter: {f:?}");
    Ok(f)
}

/// Compiles a filter evaluated against a single value rather than a document, as
/// `$elemMatch` does: operator keys test the value, field keys test its members.
pub fn compile_value_filter(doc: &Document) -> Result<Filter, DbError> {
    compile_clauses(doc, Ctx::Value, 0)
}

pub(crate) fn is_operator_doc(d: &Document) -> bool {
    d.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn compile_clauses(doc: &Document, ctx: Ctx<'_>, depth: usize) -> Result<Filter, DbError> {
    if depth > MAX_FILTER_DEPTH {
        return Err(DbError::QueryError("filter nested too deeply".into()));
    }
    let mut clauses = Vec::with_capacity(doc.len());
    for (key, value) in doc {
        match key.as_str() {
            "$and" => clauses.push(Filter::And(sub_filters(key, value, ctx, depth)?)),
            "$or" => clauses.push(Filter::Or(sub_filters(key, value, ctx, depth)?)),
            "$nor" => clauses.push(Filter::Nor(sub_filters(key, value, ctx, depth)?)),
            // consumed by the sibling $regex
            "$options" => {
                if !doc.contains_key("$regex") {
                    return Err(DbError::QueryError("$options without $regex".into()));
                }
            }
            op if op.starts_with('$') => {
                let path = ctx.operand_path(op)?;
                clauses.push(compile_operator(op, value, doc, path, depth)?);
            }
            field => {
                if let Ctx::Field(p) = ctx {
                    return Err(DbError::QueryError(format!(
                        "field '{field}' mixed into operator document for '{p}'"
                    )));
                }
                clauses.push(compile_field(field, value, depth)?);
            }
        }
    }
    Ok(match clauses.len() {
        0 => Filter::True,
        1 => clauses.remove(0),
        _ => Filter::And(clauses),
    })
}

fn sub_filters(op: &str, value: &Bson, ctx: Ctx<'_>, depth: usize) -> Result<Vec<Filter>, DbError> {
    let Bson::Array(items) = value else {
        return Err(DbError::QueryError(format!("{op} expects an array")));
    };
    if items.is_empty() {
        return Err(DbError::QueryError(format!("{op} expects a non-empty array")));
    }
    items
        .iter()
        .map(|item| match item {
            Bson::Document(d) => compile_clauses(d, ctx, depth + 1),
            other => Err(DbError::QueryError(format!("{op} entries must be documents, got {other}"))),
        })
        .collect()
}

fn compile_field(field: &str, value: &Bson, depth: usize) -> Result<Filter, DbError> {
    let path = Some(field.to_string());
    match value {
        Bson::Document(d) if is_operator_doc(d) => compile_clauses(d, Ctx::Field(field), depth + 1),
        Bson::RegularExpression(r) => Ok(Filter::Field {
            path,
            cond: Cond::Regex(build_regex(r.pattern.as_str(), r.options.as_str())?),
        }),
        v => Ok(Filter::Field { path, cond: Cond::Cmp { op: CmpOp::Eq, value: v.clone() } }),
    }
}

fn compile_operator(
    op: &str,
    value: &Bson,
    siblings: &Document,
    path: Option<String>,
    depth: usize,
) -> Result<Filter, DbError> {
    let cmp = |op| Cond::Cmp { op, value: value.clone() };
    let cond = match op {
        "$eq" => cmp(CmpOp::Eq),
        "$ne" => cmp(CmpOp::Ne),
        "$gt" => cmp(CmpOp::Gt),
        "$gte" => cmp(CmpOp::Gte),
        "$lt" => cmp(CmpOp::Lt),
        "$lte" => cmp(CmpOp::Lte),
        "$in" => Cond::In(in_items(op, value)?),
        "$nin" => Cond::Nin(in_items(op, value)?),
        "$exists" => Cond::Exists(truthy(value)),
        "$type" => Cond::Type(match value {
            Bson::Array(items) => items.iter().map(BsonKind::parse).collect::<Result<_, _>>()?,
            single => vec![BsonKind::parse(single)?],
        }),
        "$regex" => {
            let extra = match siblings.get("$options") {
                Some(Bson::String(o)) => o.as_str(),
                Some(other) => {
                    return Err(DbError::QueryError(format!("$options must be a string, got {other}")));
                }
                None => "",
            };
            Cond::Regex(match value {
                Bson::String(p) => build_regex(p, extra)?,
                Bson::RegularExpression(r) => {
                    build_regex(r.pattern.as_str(), &format!("{}{extra}", r.options.as_str()))?
                }
                other => {
                    return Err(DbError::QueryError(format!("$regex needs a string, got {other}")));
                }
            })
        }
        "$elemMatch" => match value {
            Bson::Document(d) => Cond::ElemMatch(Box::new(compile_clauses(d, Ctx::Value, depth + 1)?)),
            other => {
                return Err(DbError::QueryError(format!("$elemMatch needs a document, got {other}")));
            }
        },
        "$all" => {
            let Bson::Array(items) = value else {
                return Err(DbError::QueryError("$all expects an array".into()));
            };
            let mut values = Vec::new();
            let mut filters = Vec::new();
            for item in items {
                match item {
                    Bson::Document(d) if is_operator_doc(d) => {
                        filters.push(compile_clauses(d, Ctx::Value, depth + 1)?);
                    }
                    v => values.push(v.clone()),
                }
            }
            Cond::All { values, filters }
        }
        "$not" => {
            let inner = match value {
                Bson::RegularExpression(r) => Filter::Field {
                    path,
                    cond: Cond::Regex(build_regex(r.pattern.as_str(), r.options.as_str())?),
                },
                Bson::Document(d) if !d.is_empty() => {
                    compile_clauses(d, ctx_of(path.as_deref()), depth + 1)?
                }
                other => {
                    return Err(DbError::QueryError(format!(
                        "$not needs a regex or operator document, got {other}"
                    )));
                }
            };
            return Ok(Filter::Not(Box::new(inner)));
        }
        unknown => return Err(DbError::UnknownOperator(unknown.to_string())),
    };
    Ok(Filter::Field { path, cond })
}

fn in_items(op: &str, value: &Bson) -> Result<Vec<InItem>, DbError> {
    let Bson::Array(items) = value else {
        return Err(DbError::QueryError(format!("{op} expects an array")));
    };
    if items.len() > MAX_IN_SET {
        return Err(DbError::QueryError(format!("{op} list longer than {MAX_IN_SET}")));
    }
    items
        .iter()
        .map(|v| match v {
            Bson::RegularExpression(r) => {
                Ok(InItem::Pattern(build_regex(r.pattern.as_str(), r.options.as_str())?))
            }
            v => Ok(InItem::Value(v.clone())),
        })
        .collect()
}

fn truthy(v: &Bson) -> bool {
    match v {
        Bson::Boolean(b) => *b,
        Bson::Int32(i) => *i != 0,
        Bson::Int64(i) => *i != 0,
        Bson::Double(f) => *f != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}

/// Builds a regex honouring the `i`, `m`, `s` and `x` option letters.
pub(crate) fn build_regex(pattern: &str, options: &str) -> Result<Regex, DbError> {
    RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .ignore_whitespace(options.contains('x'))
        .build()
        .map_err(|e| DbError::InvalidRegex(format!("{pattern}: {e}")))
}

#[derive(Clone, Copy)]
enum Modifier {
    Set,
    Unset,
    Push,
    Pull,
}

/// Compiles an update document. Every modifier is validated before any is applied,
/// so a bad document never leaves a target half-updated.
///
/// # Errors
/// `UnsupportedUpdateOperator` for any top-level key other than `$set`, `$unset`,
/// `$push` and `$pull`; `QueryError` for malformed modifier arguments.
pub fn compile_update(doc: &Document) -> Result<UpdateDoc, DbError> {
    let mut out = UpdateDoc::default();
    for (op, arg) in doc {
        let modifier = match op.as_str() {
            "$set" => Modifier::Set,
            "$unset" => Modifier::Unset,
            "$push" => Modifier::Push,
            "$pull" => Modifier::Pull,
            other => return Err(DbError::UnsupportedUpdateOperator(other.to_string())),
        };
        let Bson::Document(fields) = arg else {
            return Err(DbError::QueryError(format!("{op} expects a document")));
        };
        for (path, value) in fields {
            let path = path.clone();
            out.ops.push(match modifier {
                Modifier::Set => UpdateOp::Set { path, value: value.clone() },
                Modifier::Unset => UpdateOp::Unset { path },
                Modifier::Push => UpdateOp::Push { path, values: push_values(value)? },
                Modifier::Pull => UpdateOp::Pull { path, matcher: pull_matcher(value)? },
            });
        }
    }
    log::debug!("compiled update with {} modifier(s)", out.ops.len());
    Ok(out)
}

fn push_values(value: &Bson) -> Result<Vec<Bson>, DbError> {
    match value {
        Bson::Document(d) if d.contains_key("$each") => {
            for k in d.keys().filter(|k| k.as_str() != "$each") {
                log::warn!("$push modifier {k} is not supported; ignored");
            }
            match d.get("$each") {
                Some(Bson::Array(items)) => Ok(items.clone()),
                _ => Err(DbError::QueryError("$each expects an array".into())),
            }
        }
        v => Ok(vec![v.clone()]),
    }
}

fn pull_matcher(value: &Bson) -> Result<PullMatcher, DbError> {
    Ok(match value {
        Bson::Document(d) => PullMatcher::Filter(compile_clauses(d, Ctx::Value, 0)?),
        Bson::RegularExpression(r) => PullMatcher::Filter(Filter::Field {
            path: None,
            cond: Cond::Regex(build_regex(r.pattern.as_str(), r.options.as_str())?),
        }),
        v => PullMatcher::Value(v.clone()),
    })
}

/// Parses filter JSON (Extended JSON values such as `{"$oid": ..}` are understood).
pub fn parse_filter_json(s: &str) -> Result<Filter, DbError> {
    let doc: Document = serde_json::from_str(s)?;
    compile_filter(&doc)
}

pub fn parse_update_json(s: &str) -> Result<UpdateDoc, DbError> {
    let doc: Document = serde_json::from_str(s)?;
    compile_update(&doc)
}
