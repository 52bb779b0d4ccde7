use bson::{Document, bson, doc};
use memdoc::errors::DbError;
use memdoc::query::{apply_update, compile_filter, compile_update, eval_filter};

fn update(d: &mut Document, u: Document) -> bool {
    apply_update(d, &compile_update(&u).unwrap())
}

#[test]
fn set_creates_missing_structure_and_pads_arrays() {
    let mut d = doc! {"Arr": [1]};
    assert!(update(&mut d, doc! {"$set": {"Arr.3": 8, "x.y": "z"}}));
    assert_eq!(d, doc! {"Arr": [1, null, null, 8], "x": {"y": "z"}});
}

#[test]
fn set_same_value_is_not_a_modification() {
    let mut d = doc! {"a": 1};
    assert!(!update(&mut d, doc! {"$set": {"a": 1}}));
}

#[test]
fn unset_then_exists_false_matches() {
    let mut d = doc! {"a": {"b": 1, "c": 2}};
    assert!(update(&mut d, doc! {"$unset": {"a.b": 1}}));
    assert_eq!(d, doc! {"a": {"c": 2}});
    assert!(eval_filter(&d, &compile_filter(&doc! {"a.b": {"$exists": false}}).unwrap()));
    assert!(!eval_filter(&d, &compile_filter(&doc! {"a.b": {"$exists": true}}).unwrap()));
}

#[test]
fn unset_positional_removes_every_element() {
    let mut d = doc! {"a": [1, 2, 3], "keep": true};
    update(&mut d, doc! {"$unset": {"a.$": ""}});
    assert_eq!(d, doc! {"a": [], "keep": true});
}

#[test]
fn push_each_and_single() {
    let mut d = doc! {"list": [0]};
    update(&mut d, doc! {"$push": {"list": {"$each": ["a", "b"]}}});
    assert_eq!(d, doc! {"list": [0, "a", "b"]});
    update(&mut d, doc! {"$push": {"list": [1, 2]}});
    assert_eq!(d, doc! {"list": [0, "a", "b", [1, 2]]});
}

#[test]
fn push_ignores_missing_and_non_array_targets() {
    let mut d = doc! {"s": "text"};
    assert!(!update(&mut d, doc! {"$push": {"s": 1, "missing": 1}}));
    assert_eq!(d, doc! {"s": "text"});
}

#[test]
fn pull_by_value_and_by_condition() {
    let mut d = doc! {"n": [1, 5, 1, 7, 3], "o": [{"k": 1}, {"k": 2}, {"k": 1}]};
    update(&mut d, doc! {"$pull": {"n": 1}});
    assert_eq!(d.get("n"), Some(&bson!([5, 7, 3])));
    update(&mut d, doc! {"$pull": {"n": {"$gte": 5}}});
    assert_eq!(d.get("n"), Some(&bson!([3])));
    update(&mut d, doc! {"$pull": {"o": {"k": 1}}});
    assert_eq!(d, doc! {"n": [3], "o": [{"k": 2}]});
}

#[test]
fn pull_through_positional_reaches_nested_arrays() {
    let mut d = doc! {"groups": [{"m": [1, 2]}, {"m": [2, 3]}]};
    update(&mut d, doc! {"$pull": {"groups.$.m": 2}});
    assert_eq!(d, doc! {"groups": [{"m": [1]}, {"m": [3]}]});
}

#[test]
fn unsupported_modifier_rejects_whole_document() {
    let err = compile_update(&doc! {"$set": {"a": 1}, "$inc": {"b": 1}}).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedUpdateOperator(op) if op == "$inc"));
    assert!(matches!(compile_update(&doc! {"a": 1}), Err(DbError::UnsupportedUpdateOperator(_))));
    assert!(compile_update(&doc! {"$set": 3}).is_err());
    assert!(compile_update(&doc! {"$push": {"a": {"$each": 1}}}).is_err());
}
