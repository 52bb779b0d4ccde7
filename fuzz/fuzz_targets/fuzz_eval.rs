#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(filter) = memdoc::query::parse_filter_json(s)
    {
        let docs = [
            bson::doc! {"a": 1, "b": 2, "name": "x"},
            bson::doc! {"a": 10, "b": -5, "name": "y", "nested": {"z": 3}, "t": [1, "s", {"k": 2}]},
            bson::doc! {"active": true, "d": 1.5},
        ];
        for d in &docs {
            let _ = memdoc::query::eval_filter(d, &filter);
        }
    }
});
