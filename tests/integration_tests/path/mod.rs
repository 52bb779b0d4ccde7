#[path = "mod_resolve.rs"]
mod resolve_tests;
