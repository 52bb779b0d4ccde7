// Submodules for separation of concerns
mod cursor;
mod eval;
mod exec;
mod parse;
mod types;
mod update;

pub use cursor::Cursor;
pub use eval::{compare_docs, eval_filter, eval_value, project_fields};
pub use exec::{
    bulk_write, count_docs, delete_many, delete_one, find_docs, find_one_and_delete,
    find_one_and_replace, find_one_and_update, update_many, update_one,
};
pub use parse::{
    compile_filter, compile_update, compile_value_filter, parse_filter_json, parse_update_json,
};
pub use types::{
    BulkReport, CmpOp, Cond, DeleteReport, Filter, FindOptions, InItem, MAX_FILTER_DEPTH, MAX_IN_SET,
    MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS, Order, PullMatcher,
    ReturnDocument, SortSpec, UpdateDoc, UpdateOp, UpdateReport, WriteRequest,
};
pub use update::apply_update;
