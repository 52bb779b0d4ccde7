use crate::path::{self, Location};
use crate::value::bson_equal;
use bson::{Bson, Document};

use super::eval::eval_value;
use super::types::{PullMatcher, UpdateDoc, UpdateOp};

/// Applies a compiled update to one document in place. Returns whether the document changed.
pub fn apply_update(doc: &mut Document, update: &UpdateDoc) -> bool {
    let before = doc.clone();
    for op in &update.ops {
        match op {
            UpdateOp::Set { path, value } => set_path(doc, path, value),
            UpdateOp::Unset { path } => unset_path(doc, path),
            UpdateOp::Push { path, values } => push_path(doc, path, values),
            UpdateOp::Pull { path, matcher } => pull_path(doc, path, matcher),
        }
    }
    *doc != before
}

fn set_path(doc: &mut Document, path: &str, value: &Bson) {
    for p in path::resolve_mut(doc, path, true) {
        if let Some(mut loc) = p.locate(doc) {
            loc.set(value.clone());
        }
    }
}

fn unset_path(doc: &mut Document, path: &str) {
    // back to front so earlier removals do not shift later element indexes
    for p in path::resolve_mut(doc, path, false).iter().rev() {
        if let Some(mut loc) = p.locate(doc) {
            loc.remove();
        }
    }
}

/// Only member locations that already hold an array are pushed to.
fn push_path(doc: &mut Document, path: &str, values: &[Bson]) {
    for p in path::resolve_mut(doc, path, false) {
        if let Some(mut loc @ Location::Field { .. }) = p.locate(doc)
            && let Some(Bson::Array(items)) = loc.get_mut()
        {
            items.extend(values.iter().cloned());
        }
    }
}

fn pull_path(doc: &mut Document, path: &str, matcher: &PullMatcher) {
    for p in path::resolve_mut(doc, path, false) {
        if let Some(mut loc @ Location::Field { .. }) = p.locate(doc)
            && let Some(Bson::Array(items)) = loc.get_mut()
        {
            items.retain(|el| !pull_hit(el, matcher));
        }
    }
}

fn pull_hit(el: &Bson, matcher: &PullMatcher) -> bool {
    match matcher {
        PullMatcher::Value(v) => bson_equal(el, v),
        PullMatcher::Filter(f) => eval_value(el, f),
    }
}
