use crate::path;
use crate::value::{bson_equal, compare_bson};
use bson::{Bson, Document};
use std::cmp::Ordering;

use super::types::{CmpOp, Cond, Filter, InItem, Order, SortSpec};

/// What a compiled filter is evaluated against.
#[derive(Clone, Copy)]
enum Subject<'a> {
    Doc(&'a Document),
    Value(&'a Bson),
}

pub fn eval_filter(doc: &Document, filter: &Filter) -> bool {
    eval(Subject::Doc(doc), filter)
}

/// Evaluates a value-level filter (from `compile_value_filter`) against one value.
pub fn eval_value(value: &Bson, filter: &Filter) -> bool {
    eval(Subject::Value(value), filter)
}

fn eval(subject: Subject<'_>, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval(subject, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval(subject, f)),
        Filter::Nor(fs) => !fs.iter().any(|f| eval(subject, f)),
        Filter::Not(f) => !eval(subject, f),
        Filter::Field { path, cond } => {
            let candidates = match (path, subject) {
                (None, Subject::Value(v)) => vec![v],
                (None, Subject::Doc(_)) => Vec::new(),
                (Some(p), Subject::Doc(d)) => path::values(d, p),
                (Some(p), Subject::Value(Bson::Document(d))) => path::values(d, p),
                (Some(_), Subject::Value(_)) => Vec::new(),
            };
            eval_cond(&candidates, cond)
        }
    }
}

/// Existential test over the values found at a path. An empty slice means the
/// path was not found.
fn eval_cond(found: &[&Bson], cond: &Cond) -> bool {
    match cond {
        Cond::Exists(want) => !found.is_empty() == *want,
        Cond::Cmp { op: CmpOp::Eq, value } => found.iter().any(|v| equals_or_contains(v, value)),
        Cond::Cmp { op: CmpOp::Ne, value } => !found.iter().any(|v| equals_or_contains(v, value)),
        Cond::Cmp { op, value } => found.iter().any(|v| any_scalar(v, |x| ordered(*op, x, value))),
        Cond::In(items) => in_set(found, items),
        Cond::Nin(items) => !in_set(found, items),
        Cond::Type(kinds) => {
            found.iter().any(|v| any_scalar(v, |x| kinds.iter().any(|k| k.matches(x))))
        }
        Cond::Regex(re) => found.iter().any(|v| {
            any_scalar(v, |x| match x {
                Bson::String(s) | Bson::Symbol(s) => re.is_match(s),
                _ => false,
            })
        }),
        Cond::ElemMatch(f) => found
            .iter()
            .any(|v| matches!(v, Bson::Array(items) if items.iter().any(|el| eval_value(el, f)))),
        Cond::All { values, filters } => {
            if values.is_empty() && filters.is_empty() {
                return false;
            }
            found.iter().any(|v| {
                let Bson::Array(items) = v else { return false };
                values.iter().all(|want| {
                    bson_equal(v, want) || items.iter().any(|el| bson_equal(el, want))
                }) && filters
                    .iter()
                    .all(|f| eval_value(v, f) || items.iter().any(|el| eval_value(el, f)))
            })
        }
    }
}

/// Applies `test` to the value itself and, when it is an array, to each element.
fn any_scalar(v: &Bson, test: impl Fn(&Bson) -> bool) -> bool {
    test(v) || matches!(v, Bson::Array(items) if items.iter().any(&test))
}

fn equals_or_contains(v: &Bson, want: &Bson) -> bool {
    any_scalar(v, |x| bson_equal(x, want))
}

fn ordered(op: CmpOp, left: &Bson, right: &Bson) -> bool {
    let ord = compare_bson(left, right);
    match op {
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Gte => ord != Ordering::Less,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Lte => ord != Ordering::Greater,
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
    }
}

fn in_set(found: &[&Bson], items: &[InItem]) -> bool {
    let hit = |x: &Bson| {
        items.iter().any(|item| match (item, x) {
            (InItem::Value(want), _) => bson_equal(x, want),
            (InItem::Pattern(re), Bson::String(s)) => re.is_match(s),
            (InItem::Pattern(_), _) => false,
        })
    };
    if found.is_empty() {
        return hit(&Bson::Null);
    }
    found.iter().any(|v| any_scalar(v, hit))
}

/// Orders two documents by a sort specification. Missing fields sort as `Null`.
pub fn compare_docs(a: &Document, b: &Document, sort: &[SortSpec]) -> Ordering {
    for s in sort {
        let va = path::first_value(a, &s.field).unwrap_or(&Bson::Null);
        let vb = path::first_value(b, &s.field).unwrap_or(&Bson::Null);
        let ord = compare_bson(va, vb);
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

/// Inclusion projection over (possibly dotted) paths.
pub fn project_fields(doc: &Document, fields: &[String]) -> Document {
    let mut out = Document::new();
    for f in fields {
        if let Some(v) = path::first_value(doc, f) {
            for p in path::resolve_mut(&mut out, f, true) {
                if let Some(mut loc) = p.locate(&mut out) {
                    loc.set(v.clone());
                }
            }
        }
    }
    out
}
