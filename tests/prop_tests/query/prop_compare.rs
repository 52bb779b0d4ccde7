use bson::doc;
use memdoc::query::{compile_filter, eval_filter};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]

    #[test]
    fn prop_gt_and_lte_are_complementary(x in any::<i64>(), y in any::<i32>()) {
        let d = doc! {"n": x};
        let gt = eval_filter(&d, &compile_filter(&doc! {"n": {"$gt": y}}).unwrap());
        let lte = eval_filter(&d, &compile_filter(&doc! {"n": {"$lte": y}}).unwrap());
        prop_assert!(gt != lte);
        prop_assert_eq!(gt, x > i64::from(y));
    }

    #[test]
    fn prop_in_agrees_with_eq(x in 0i32..20, set in proptest::collection::vec(0i32..20, 1..6)) {
        let d = doc! {"n": x};
        let by_in = eval_filter(&d, &compile_filter(&doc! {"n": {"$in": set.clone()}}).unwrap());
        let by_nin = eval_filter(&d, &compile_filter(&doc! {"n": {"$nin": set.clone()}}).unwrap());
        prop_assert_eq!(by_in, set.contains(&x));
        prop_assert!(by_in != by_nin);
    }
}
