use bson::{Bson, Document};
use std::cmp::Ordering;

pub(crate) fn is_numeric(v: &Bson) -> bool {
    matches!(v, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

/// Numeric view of a value; `None` for non-numeric kinds.
pub fn as_f64(v: &Bson) -> Option<f64> {
    match v {
        Bson::Int32(i) => Some(f64::from(*i)),
        #[allow(clippy::cast_precision_loss)]
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => Some(d.to_string().parse::<f64>().unwrap_or(f64::NAN)),
        _ => None,
    }
}

fn as_i64(v: &Bson) -> Option<i64> {
    match v {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        _ => None,
    }
}

/// Structural equality. Numbers compare by value across Int32/Int64/Double/Decimal128;
/// documents need the same keys in the same order; arrays need the same elements in order.
pub fn bson_equal(a: &Bson, b: &Bson) -> bool {
    if is_numeric(a) && is_numeric(b) {
        return compare_numbers(a, b) == Ordering::Equal;
    }
    match (a, b) {
        (Bson::Document(x), Bson::Document(y)) => docs_equal(x, y),
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| bson_equal(l, r))
        }
        (Bson::RegularExpression(x), Bson::RegularExpression(y)) => {
            x.pattern.as_str() == y.pattern.as_str() && x.options.as_str() == y.options.as_str()
        }
        _ => a == b,
    }
}

pub fn docs_equal(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| ka == kb && bson_equal(va, vb))
}

fn compare_numbers(a: &Bson, b: &Bson) -> Ordering {
    if let (Some(x), Some(y)) = (as_i64(a), as_i64(b)) {
        return x.cmp(&y);
    }
    let x = as_f64(a).unwrap_or(f64::NAN);
    let y = as_f64(b).unwrap_or(f64::NAN);
    x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
}

/// Canonical rank of a value's kind in the cross-type ordering.
///
/// MinKey < Null/Undefined < numbers < String/Symbol < Document < Array < Binary
/// < ObjectId < Boolean < DateTime < Timestamp < Regex < code < DbPointer < MaxKey
pub fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::JavaScriptCode(_) => 12,
        Bson::JavaScriptCodeWithScope(_) => 13,
        Bson::DbPointer(_) => 14,
        Bson::MaxKey => 255,
    }
}

/// Total order over values: first by `type_rank`, then by the natural order within a kind.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    let (ra, rb) = (type_rank(a), type_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        _ if is_numeric(a) => compare_numbers(a, b),
        (Bson::String(x) | Bson::Symbol(x), Bson::String(y) | Bson::Symbol(y)) => x.cmp(y),
        (Bson::Document(x), Bson::Document(y)) => compare_docs(x, y),
        (Bson::Array(x), Bson::Array(y)) => compare_seq(x.iter(), y.iter()),
        (Bson::Binary(x), Bson::Binary(y)) => {
            x.bytes.len().cmp(&y.bytes.len()).then_with(|| x.bytes.cmp(&y.bytes))
        }
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => {
            x.time.cmp(&y.time).then_with(|| x.increment.cmp(&y.increment))
        }
        (Bson::RegularExpression(x), Bson::RegularExpression(y)) => x
            .pattern
            .as_str()
            .cmp(y.pattern.as_str())
            .then_with(|| x.options.as_str().cmp(y.options.as_str())),
        (Bson::JavaScriptCode(x), Bson::JavaScriptCode(y)) => x.cmp(y),
        (Bson::JavaScriptCodeWithScope(x), Bson::JavaScriptCodeWithScope(y)) => {
            x.code.cmp(&y.code).then_with(|| compare_docs(&x.scope, &y.scope))
        }
        _ => Ordering::Equal,
    }
}

fn compare_docs(a: &Document, b: &Document) -> Ordering {
    for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
        let ord = compare_bson(va, vb).then_with(|| ka.cmp(kb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_seq<'a>(
    mut a: impl Iterator<Item = &'a Bson>,
    mut b: impl Iterator<Item = &'a Bson>,
) -> Ordering {
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => {
                let ord = compare_bson(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return Ordering::Equal,
        }
    }
}
