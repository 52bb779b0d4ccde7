#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(update) = memdoc::query::parse_update_json(s)
    {
        // positional and padding paths on a small mixed document
        let mut doc = bson::doc! {"a": 1, "arr": [1, {"b": 2}, [3]], "n": {"m": null}};
        let _ = memdoc::query::apply_update(&mut doc, &update);
    }
});
