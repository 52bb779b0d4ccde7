// Mirror src/utils and src/config
#[path = "mod_config.rs"]
mod config_tests;
#[path = "mod_json.rs"]
mod json_tests;
#[path = "mod_logger.rs"]
mod logger_tests;
