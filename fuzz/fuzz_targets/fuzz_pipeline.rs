#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(p) = memdoc::aggregate::parse_pipeline_json(s)
    {
        let input = vec![bson::doc! {"k": 2, "v": "b"}, bson::doc! {"k": 1, "v": "a", "arr": [1, 2]}];
        let _ = p.run(input);
    }
});
