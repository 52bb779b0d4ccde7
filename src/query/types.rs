use crate::value::BsonKind;
use bson::{Bson, Document};
use regex::Regex;
use serde::{Deserialize, Serialize};

// Limits enforced where text specs are parsed (CLI, pipeline `$sort`)
pub const MAX_IN_SET: usize = 1000;
pub const MAX_SORT_FIELDS: usize = 8;
pub const MAX_PROJECTION_FIELDS: usize = 64;
pub const MAX_FILTER_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

/// Options for `find_docs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Option<Vec<String>>,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// One member of a `$in`/`$nin` list. Regex members match string values by pattern.
#[derive(Debug, Clone)]
pub enum InItem {
    Value(Bson),
    Pattern(Regex),
}

/// Predicate applied to the candidate values found at a path.
#[derive(Debug, Clone)]
pub enum Cond {
    Cmp { op: CmpOp, value: Bson },
    In(Vec<InItem>),
    Nin(Vec<InItem>),
    Exists(bool),
    Type(Vec<BsonKind>),
    Regex(Regex),
    ElemMatch(Box<Filter>),
    All { values: Vec<Bson>, filters: Vec<Filter> },
}

/// A compiled filter document.
///
/// `Field { path: None, .. }` tests the subject value itself; it appears inside
/// `$elemMatch`, `$all` sub-filters and `$pull` conditions where the subject is an
/// array element rather than a document.
#[derive(Debug, Clone)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Nor(Vec<Filter>),
    Not(Box<Filter>),
    Field { path: Option<String>, cond: Cond },
}

/// How `$pull` picks elements to remove.
#[derive(Debug, Clone)]
pub enum PullMatcher {
    Value(Bson),
    Filter(Filter),
}

#[derive(Debug, Clone)]
pub enum UpdateOp {
    Set { path: String, value: Bson },
    Unset { path: String },
    Push { path: String, values: Vec<Bson> },
    Pull { path: String, matcher: PullMatcher },
}

/// A compiled update document: modifiers in the order they were written.
#[derive(Debug, Default, Clone)]
pub struct UpdateDoc {
    pub ops: Vec<UpdateOp>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub deleted: u64,
}

/// Which version of the document `find_one_and_*` hands back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnDocument {
    #[default]
    Before,
    After,
}

#[derive(Debug, Clone)]
pub enum WriteRequest {
    InsertOne(Document),
    UpdateOne { filter: Filter, update: UpdateDoc },
    UpdateMany { filter: Filter, update: UpdateDoc },
    ReplaceOne { filter: Filter, replacement: Document },
    DeleteOne { filter: Filter },
    DeleteMany { filter: Filter },
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReport {
    pub inserted: u64,
    pub matched: u64,
    pub modified: u64,
    pub deleted: u64,
}
