#[path = "mod_pipeline.rs"]
mod pipeline_tests;
