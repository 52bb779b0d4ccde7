use bson::{Document, doc};
use memdoc::aggregate::run_pipeline;
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 64,
        .. proptest::test_runner::Config::default()
    })]

    #[test]
    fn prop_multi_key_sort_is_ordered_and_stable(v in proptest::collection::vec((0i64..4, 0i64..4), 0..20)) {
        let input: Vec<Document> =
            v.iter().enumerate().map(|(i, (a, b))| doc! {"a": *a, "b": *b, "i": i as i64}).collect();
        let out = run_pipeline(&[doc! {"$sort": {"a": -1, "b": 1}}], input).unwrap();
        prop_assert_eq!(out.documents.len(), v.len());
        for w in out.documents.windows(2) {
            let key = |d: &Document| (d.get_i64("a").unwrap(), d.get_i64("b").unwrap(), d.get_i64("i").unwrap());
            let (a0, b0, i0) = key(&w[0]);
            let (a1, b1, i1) = key(&w[1]);
            prop_assert!(a0 > a1 || (a0 == a1 && (b0 < b1 || (b0 == b1 && i0 < i1))));
        }
    }
}
