use bson::{Document, doc};
use memdoc::collection::Collection;
use memdoc::query::{
    self, FindOptions, Order, ReturnDocument, SortSpec, WriteRequest, compile_filter, compile_update,
};
use memdoc::types::Namespace;
use memdoc::utils::tracelog;
use std::sync::Arc;

fn inventory() -> Arc<Collection> {
    let col = Arc::new(Collection::new(Namespace::new("shop", "items")));
    col.insert_many(vec![
        doc! {"sku": "a", "qty": 5, "tags": ["x"]},
        doc! {"sku": "b", "qty": 0, "tags": []},
        doc! {"sku": "c", "qty": 12, "tags": ["x", "y"]},
        doc! {"sku": "d", "qty": 5},
    ]);
    col
}

fn f(d: Document) -> query::Filter {
    compile_filter(&d).unwrap()
}

fn skus(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.get_str("sku").unwrap()).collect()
}

#[test]
fn find_with_sort_skip_limit_projection() {
    let col = inventory();
    let opts = FindOptions {
        projection: Some(vec!["sku".into()]),
        sort: Some(vec![
            SortSpec { field: "qty".into(), order: Order::Desc },
            SortSpec { field: "sku".into(), order: Order::Asc },
        ]),
        skip: Some(1),
        limit: Some(2),
    };
    let docs = query::find_docs(&col, &f(doc! {"qty": {"$gt": 0}}), &opts).to_vec();
    assert_eq!(docs, vec![doc! {"sku": "a"}, doc! {"sku": "d"}]);
}

#[test]
fn cursor_iterates_remaining() {
    let col = inventory();
    let mut cur = query::find_docs(&col, &f(doc! {"tags": "x"}), &FindOptions::default());
    assert_eq!(cur.remaining(), 2);
    assert_eq!(cur.next().unwrap().get_str("sku").unwrap(), "a");
    assert_eq!(skus(&cur.to_vec()), vec!["c"]);
}

#[test]
fn update_and_delete_reports() {
    let col = inventory();
    let r = query::update_many(&col, &f(doc! {"qty": 5}), &compile_update(&doc! {"$set": {"hot": true}}).unwrap());
    assert_eq!((r.matched, r.modified), (2, 2));
    let r = query::update_one(&col, &f(doc! {"hot": true}), &compile_update(&doc! {"$set": {"hot": true}}).unwrap());
    assert_eq!((r.matched, r.modified), (1, 0));
    assert_eq!(query::delete_one(&col, &f(doc! {"hot": true})).deleted, 1);
    assert_eq!(query::delete_many(&col, &f(doc! {})).deleted, 3);
    assert!(col.is_empty());
}

#[test]
fn find_one_and_variants() {
    let col = inventory();
    let before = query::find_one_and_update(
        &col,
        &f(doc! {"sku": "b"}),
        &compile_update(&doc! {"$push": {"tags": "new"}}).unwrap(),
        ReturnDocument::Before,
    )
    .unwrap();
    assert_eq!(before, doc! {"sku": "b", "qty": 0, "tags": []});
    let after = query::find_one_and_replace(
        &col,
        &f(doc! {"sku": "b"}),
        doc! {"sku": "b2"},
        ReturnDocument::After,
    )
    .unwrap();
    assert_eq!(after, doc! {"sku": "b2"});
    let gone = query::find_one_and_delete(&col, &f(doc! {"sku": "b2"})).unwrap();
    assert_eq!(gone, doc! {"sku": "b2"});
    assert!(query::find_one_and_delete(&col, &f(doc! {"sku": "b2"})).is_none());
    assert_eq!(col.len(), 3);
}

#[test]
fn bulk_write_applies_in_order() {
    let col = inventory();
    let report = query::bulk_write(
        &col,
        vec![
            WriteRequest::InsertOne(doc! {"sku": "e", "qty": 1}),
            WriteRequest::UpdateMany {
                filter: f(doc! {"qty": {"$lt": 2}}),
                update: compile_update(&doc! {"$set": {"low": true}}).unwrap(),
            },
            WriteRequest::ReplaceOne { filter: f(doc! {"sku": "c"}), replacement: doc! {"sku": "c", "qty": 0} },
            WriteRequest::DeleteMany { filter: f(doc! {"low": true}) },
        ],
    );
    assert_eq!(report.inserted, 1);
    assert_eq!(report.matched, 3);
    assert_eq!(report.modified, 3);
    assert_eq!(report.deleted, 2);
    assert_eq!(skus(&col.snapshot()), vec!["a", "c", "d"]);
}

#[test]
fn operations_emit_trace_lines() {
    let col = inventory();
    let _g = tracelog::capture();
    let _ = query::count_docs(&col, &f(doc! {"qty": 5}));
    query::delete_many(&col, &f(doc! {"qty": 0}));
    let lines = tracelog::drain();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"op\":\"count\"") && lines[0].contains("\"result_count\":2"));
    assert!(lines[1].contains("\"op\":\"delete_many\"") && lines[1].contains("shop@items"));
}

#[test]
fn every_sort_key_takes_part() {
    let col = Arc::new(Collection::new(Namespace::new("shop", "wide")));
    let mut low = Document::new();
    let mut high = Document::new();
    for i in 1..=8 {
        low.insert(format!("k{i}"), 0);
        high.insert(format!("k{i}"), 0);
    }
    low.insert("k9", 1);
    high.insert("k9", 2);
    col.insert_many(vec![low, high]);

    let mut sort: Vec<SortSpec> =
        (1..=8).map(|i| SortSpec { field: format!("k{i}"), order: Order::Asc }).collect();
    sort.push(SortSpec { field: "k9".into(), order: Order::Desc });
    let opts = FindOptions { sort: Some(sort), ..Default::default() };
    let out = query::find_docs(&col, &f(doc! {}), &opts).to_vec();
    let k9: Vec<i32> = out.iter().map(|d| d.get_i32("k9").unwrap()).collect();
    assert_eq!(k9, vec![2, 1]);
}

#[test]
fn projection_keeps_every_requested_field() {
    let col = Arc::new(Collection::new(Namespace::new("shop", "many")));
    let d: Document = (0..80).map(|i| (format!("f{i}"), bson::Bson::Int32(i))).collect();
    col.insert_many(vec![d.clone()]);
    let fields: Vec<String> = (0..80).map(|i| format!("f{i}")).collect();
    let opts = FindOptions { projection: Some(fields), ..Default::default() };
    let out = query::find_docs(&col, &f(doc! {}), &opts).to_vec();
    assert_eq!(out, vec![d]);
}
