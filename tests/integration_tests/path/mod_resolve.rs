use bson::{Bson, Document, bson, doc};
use memdoc::path::{Location, MAX_ARRAY_INDEX, first_value, resolve, resolve_mut, values};
use memdoc::query::{apply_update, compile_update};

fn set_at(d: &mut Document, path: &str, v: Bson) -> usize {
    let targets = resolve_mut(d, path, true);
    for p in &targets {
        if let Some(mut loc) = p.locate(d) {
            loc.set(v.clone());
        }
    }
    targets.len()
}

#[test]
fn positional_ids_in_index_order() {
    let d = doc! {"Array": [{"id": 1}, {"id": 2}]};
    let ids: Vec<Bson> = values(&d, "Array.$.id").into_iter().cloned().collect();
    assert_eq!(ids, vec![bson!(1), bson!(2)]);
}

#[test]
fn set_through_positional_writes_every_element() {
    let mut d = doc! {"Array": [{"id": 1}, {"id": 2}, {"id": 3}]};
    assert_eq!(set_at(&mut d, "Array.$.seen", bson!(true)), 3);
    assert_eq!(values(&d, "Array.seen").len(), 3);
}

#[test]
fn auto_create_builds_nested_documents() {
    let mut d = doc! {};
    set_at(&mut d, "a.b.c", bson!(1));
    assert_eq!(d, doc! {"a": {"b": {"c": 1}}});
}

#[test]
fn auto_create_pads_intermediate_index() {
    let mut d = doc! {"rows": [{"v": 0}]};
    set_at(&mut d, "rows.2.v", bson!(9));
    assert_eq!(d, doc! {"rows": [{"v": 0}, null, {"v": 9}]});
}

#[test]
fn reads_never_create() {
    let d = doc! {"a": 1};
    assert!(resolve(&d, "b.c").is_empty());
    assert_eq!(first_value(&d, "b"), None);
    assert_eq!(d, doc! {"a": 1});
}

#[test]
fn element_location_remove_shifts() {
    let mut d = doc! {"a": [1, 2, 3]};
    let p = resolve_mut(&mut d, "a.1", false).remove(0);
    match p.locate(&mut d) {
        Some(mut loc @ Location::Element { .. }) => {
            assert!(loc.has());
            assert_eq!(loc.remove(), Some(bson!(2)));
        }
        other => panic!("expected an element location, got {other:?}"),
    }
    assert_eq!(d, doc! {"a": [1, 3]});
}

#[test]
fn field_location_has_and_get() {
    let mut d = doc! {"a": {"b": 5}};
    let paths = resolve_mut(&mut d, "a.c", false);
    assert_eq!(paths.len(), 1);
    let loc = paths[0].locate(&mut d).unwrap();
    assert!(!loc.has());
    assert!(loc.get().is_none());
}

#[test]
fn huge_numeric_segment_does_not_grow_array() {
    for key in ["a.18446744073709551615", "a.4000000000", "a.99999999999999999999999"] {
        let mut d = doc! {"a": [1, 2]};
        let update = compile_update(&doc! {"$set": {key: 1}}).unwrap();
        apply_update(&mut d, &update);
        assert_eq!(d.get_array("a").unwrap().len(), 2, "{key}");
    }
}

#[test]
fn index_past_limit_is_a_field_name() {
    let mut d = doc! {"a": [{"x": 0}]};
    let past = format!("a.{}", MAX_ARRAY_INDEX + 1);
    set_at(&mut d, &past, bson!(1));
    // treated as a field name on each element
    assert_eq!(d.get_array("a").unwrap().len(), 1);
    assert_eq!(first_value(&d, &format!("a.0.{}", MAX_ARRAY_INDEX + 1)), Some(&bson!(1)));
}

#[test]
fn signed_segment_is_a_field_name() {
    let d = doc! {"a": [{"+1": "plus"}, 10, 20]};
    let got: Vec<Bson> = values(&d, "a.+1").into_iter().cloned().collect();
    assert_eq!(got, vec![bson!("plus")]);

    let mut d = doc! {"a": [{"k": 0}, {"k": 1}]};
    assert_eq!(set_at(&mut d, "a.+1", bson!(true)), 2);
    assert_eq!(d, doc! {"a": [{"k": 0, "+1": true}, {"k": 1, "+1": true}]});
}
