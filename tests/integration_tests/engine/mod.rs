#[path = "mod_engine.rs"]
mod engine_tests;
