//! Value semantics shared by filters, updates and pipelines: structural equality,
//! the cross-type ordering lattice, and the `$type` kind table.

mod compare;
mod kind;

pub use compare::{as_f64, bson_equal, compare_bson, docs_equal, type_rank};
pub(crate) use compare::is_numeric;
pub use kind::BsonKind;
