use crate::collection::Collection;
use bson::Document;
use std::sync::Arc;
use std::time::Instant;

use super::cursor::Cursor;
use super::eval::{compare_docs, eval_filter, project_fields};
use super::types::{
    BulkReport, DeleteReport, Filter, FindOptions, ReturnDocument, UpdateDoc, UpdateReport,
    WriteRequest,
};
use super::update::apply_update;

fn micros(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}

pub fn find_docs(col: &Arc<Collection>, filter: &Filter, opts: &FindOptions) -> Cursor {
    let start = Instant::now();
    let mut docs: Vec<Document> =
        col.read(|all| all.iter().filter(|d| eval_filter(d, filter)).cloned().collect());

    if let Some(sort) = &opts.sort {
        docs.sort_by(|a, b| compare_docs(a, b, sort));
    }

    let skip = opts.skip.unwrap_or(0).min(docs.len());
    let limit = opts.limit.unwrap_or(usize::MAX);
    let mut docs: Vec<Document> = docs.into_iter().skip(skip).take(limit).collect();

    if let Some(fields) = &opts.projection {
        for d in &mut docs {
            *d = project_fields(d, fields);
        }
    }
    crate::qtrace!(
        "{{\"op\":\"find\",\"ns\":\"{}\",\"duration_us\":{},\"result_count\":{},\"limit\":{},\"skip\":{}}}",
        col.name_str(),
        micros(start),
        docs.len(),
        opts.limit.unwrap_or(0),
        skip
    );
    Cursor::new(docs)
}

#[must_use]
pub fn count_docs(col: &Arc<Collection>, filter: &Filter) -> usize {
    let start = Instant::now();
    let n = col.read(|all| all.iter().filter(|d| eval_filter(d, filter)).count());
    crate::qtrace!(
        "{{\"op\":\"count\",\"ns\":\"{}\",\"duration_us\":{},\"result_count\":{}}}",
        col.name_str(),
        micros(start),
        n
    );
    n
}

fn update_matching(col: &Arc<Collection>, filter: &Filter, update: &UpdateDoc, multi: bool) -> UpdateReport {
    let start = Instant::now();
    let mut report = UpdateReport::default();
    col.write(|docs| {
        for d in docs.iter_mut().filter(|d| eval_filter(d, filter)) {
            report.matched += 1;
            if apply_update(d, update) {
                report.modified += 1;
            }
            if !multi {
                break;
            }
        }
    });
    if report.modified > 0 {
        log::info!(target: "memdoc::audit", "update ns={} modified={}", col.name_str(), report.modified);
    }
    crate::qtrace!(
        "{{\"op\":\"{}\",\"ns\":\"{}\",\"duration_us\":{},\"matched\":{},\"modified\":{}}}",
        if multi { "update_many" } else { "update_one" },
        col.name_str(),
        micros(start),
        report.matched,
        report.modified
    );
    report
}

pub fn update_many(col: &Arc<Collection>, filter: &Filter, update: &UpdateDoc) -> UpdateReport {
    update_matching(col, filter, update, true)
}

pub fn update_one(col: &Arc<Collection>, filter: &Filter, update: &UpdateDoc) -> UpdateReport {
    update_matching(col, filter, update, false)
}

pub fn delete_many(col: &Arc<Collection>, filter: &Filter) -> DeleteReport {
    let start = Instant::now();
    let deleted = col.remove_where(|d| eval_filter(d, filter)) as u64;
    crate::qtrace!(
        "{{\"op\":\"delete_many\",\"ns\":\"{}\",\"duration_us\":{},\"deleted\":{}}}",
        col.name_str(),
        micros(start),
        deleted
    );
    DeleteReport { deleted }
}

pub fn delete_one(col: &Arc<Collection>, filter: &Filter) -> DeleteReport {
    let deleted = u64::from(find_one_and_delete(col, filter).is_some());
    DeleteReport { deleted }
}

pub fn find_one_and_delete(col: &Arc<Collection>, filter: &Filter) -> Option<Document> {
    let start = Instant::now();
    let removed = col.write(|docs| {
        let idx = docs.iter().position(|d| eval_filter(d, filter))?;
        Some(docs.remove(idx))
    });
    if removed.is_some() {
        log::info!(target: "memdoc::audit", "delete ns={} count=1", col.name_str());
    }
    crate::qtrace!(
        "{{\"op\":\"find_one_and_delete\",\"ns\":\"{}\",\"duration_us\":{},\"deleted\":{}}}",
        col.name_str(),
        micros(start),
        u8::from(removed.is_some())
    );
    removed
}

pub fn find_one_and_replace(
    col: &Arc<Collection>,
    filter: &Filter,
    replacement: Document,
    ret: ReturnDocument,
) -> Option<Document> {
    let out = col.write(|docs| {
        let slot = docs.iter_mut().find(|d| eval_filter(d, filter))?;
        let before = std::mem::replace(slot, replacement);
        Some(match ret {
            ReturnDocument::Before => before,
            ReturnDocument::After => slot.clone(),
        })
    });
    if out.is_some() {
        log::info!(target: "memdoc::audit", "replace ns={} count=1", col.name_str());
    }
    out
}

pub fn find_one_and_update(
    col: &Arc<Collection>,
    filter: &Filter,
    update: &UpdateDoc,
    ret: ReturnDocument,
) -> Option<Document> {
    let out = col.write(|docs| {
        let slot = docs.iter_mut().find(|d| eval_filter(d, filter))?;
        let before = slot.clone();
        apply_update(slot, update);
        Some(match ret {
            ReturnDocument::Before => before,
            ReturnDocument::After => slot.clone(),
        })
    });
    if out.is_some() {
        log::info!(target: "memdoc::audit", "update ns={} count=1", col.name_str());
    }
    out
}

/// Applies write requests in order, accumulating one report.
pub fn bulk_write(col: &Arc<Collection>, requests: Vec<WriteRequest>) -> BulkReport {
    let mut report = BulkReport::default();
    for req in requests {
        match req {
            WriteRequest::InsertOne(doc) => {
                col.insert_document(doc);
                report.inserted += 1;
            }
            WriteRequest::UpdateOne { filter, update } => {
                let r = update_one(col, &filter, &update);
                report.matched += r.matched;
                report.modified += r.modified;
            }
            WriteRequest::UpdateMany { filter, update } => {
                let r = update_many(col, &filter, &update);
                report.matched += r.matched;
                report.modified += r.modified;
            }
            WriteRequest::ReplaceOne { filter, replacement } => {
                if let Some(before) =
                    find_one_and_replace(col, &filter, replacement.clone(), ReturnDocument::Before)
                {
                    report.matched += 1;
                    if before != replacement {
                        report.modified += 1;
                    }
                }
            }
            WriteRequest::DeleteOne { filter } => report.deleted += delete_one(col, &filter).deleted,
            WriteRequest::DeleteMany { filter } => report.deleted += delete_many(col, &filter).deleted,
        }
    }
    report
}
