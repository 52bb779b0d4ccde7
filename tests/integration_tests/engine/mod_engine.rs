use bson::doc;
use memdoc::aggregate::parse_pipeline_json;
use memdoc::engine::Engine;
use memdoc::errors::DbError;
use memdoc::query::{self, FindOptions, compile_filter};
use memdoc::types::Namespace;
use std::sync::Arc;

#[test]
fn namespaces_are_isolated_by_database() {
    let e = Engine::new();
    e.get_or_create(&Namespace::new("a", "docs")).insert_document(doc! {"n": 1});
    e.get_or_create(&Namespace::new("b", "docs")).insert_document(doc! {"n": 2});
    assert_eq!(e.get_collection(&Namespace::new("a", "docs")).unwrap().snapshot(), vec![doc! {"n": 1}]);
    assert_eq!(e.list_namespaces().len(), 2);
}

#[test]
fn concurrent_get_or_create_shares_one_collection() {
    let e = Arc::new(Engine::new());
    let ns = Namespace::new("db", "shared");
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let e = e.clone();
            let ns = ns.clone();
            std::thread::spawn(move || {
                e.get_or_create(&ns).insert_document(doc! {"i": i});
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let col = e.get_collection(&ns).unwrap();
    assert_eq!(col.len(), 8);
    let f = compile_filter(&doc! {"i": {"$gte": 4}}).unwrap();
    assert_eq!(query::find_docs(&col, &f, &FindOptions::default()).remaining(), 4);
}

#[test]
fn aggregate_out_replaces_target() {
    let e = Engine::new();
    let src = Namespace::new("db", "events");
    e.get_or_create(&src).insert_many(vec![doc! {"k": 2}, doc! {"k": 1}, doc! {"k": 3}]);
    let target = e.get_or_create(&Namespace::new("db", "top"));
    target.insert_document(doc! {"stale": true});

    let p = parse_pipeline_json(r#"[{"$sort": {"k": -1}}, {"$limit": 2}, {"$out": "top"}]"#).unwrap();
    let out = e.aggregate(&src, &p).unwrap();
    assert_eq!(out.documents.len(), 2);
    assert_eq!(target.snapshot(), out.documents);
    assert_eq!(target.snapshot()[0].get_i32("k").unwrap(), 3);
}

#[test]
fn aggregate_unknown_namespace() {
    let e = Engine::new();
    let p = parse_pipeline_json("[]").unwrap();
    let err = e.aggregate(&Namespace::new("db", "ghost"), &p).unwrap_err();
    assert!(matches!(err, DbError::NoSuchCollection(ns) if ns == "db@ghost"));
}
