//! TOML configuration for the CLI and embedding applications.
//!
//! Precedence: explicit path > `MEMDOC_CONFIG` > `./memdoc.toml` >
//! `$HOME/.config/memdoc.toml`, then `MEMDOC_*` environment variables for fields
//! still unset, then built-in defaults.

use crate::errors::DbError;
use crate::utils::logger::LogSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "test";
pub const DEFAULT_COLLECTION: &str = "docs";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_retention: Option<u32>,
    pub trace: Option<bool>,
    pub default_database: Option<String>,
    pub default_collection: Option<String>,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, DbError> {
        toml::from_str(s).map_err(|e| DbError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, DbError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&text).map_err(|e| DbError::Config(format!("{}: {e}", path.display())))
    }

    /// Fills fields still unset from `other`.
    pub fn merge_missing(&mut self, other: Self) {
        self.log_dir = self.log_dir.take().or(other.log_dir);
        self.log_level = self.log_level.take().or(other.log_level);
        self.log_retention = self.log_retention.or(other.log_retention);
        self.trace = self.trace.or(other.trace);
        self.default_database = self.default_database.take().or(other.default_database);
        self.default_collection = self.default_collection.take().or(other.default_collection);
    }

    /// Fills unset fields from `MEMDOC_*` variables read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.merge_missing(Self {
            log_dir: lookup("MEMDOC_LOG_DIR").map(PathBuf::from),
            log_level: lookup("MEMDOC_LOG_LEVEL"),
            log_retention: lookup("MEMDOC_LOG_RETENTION").and_then(|s| s.parse().ok()),
            trace: lookup("MEMDOC_TRACE").map(|s| matches!(s.as_str(), "1" | "true" | "yes")),
            default_database: lookup("MEMDOC_DEFAULT_DATABASE"),
            default_collection: lookup("MEMDOC_DEFAULT_COLLECTION"),
        });
    }

    pub fn database(&self) -> &str {
        self.default_database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    pub fn collection(&self) -> &str {
        self.default_collection.as_deref().unwrap_or(DEFAULT_COLLECTION)
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            dir: self.log_dir.clone(),
            level: self.log_level.clone(),
            retention: self.log_retention,
            trace: self.trace.unwrap_or(false),
        }
    }
}

/// Candidate config files, highest precedence first.
pub fn config_paths(cli: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = cli {
        paths.push(p.to_path_buf());
    }
    if let Some(p) = lookup("MEMDOC_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    paths.push(PathBuf::from("memdoc.toml"));
    if let Some(home) = lookup("HOME").or_else(|| lookup("USERPROFILE")) {
        paths.push(PathBuf::from(home).join(".config").join("memdoc.toml"));
    }
    paths
}

/// Loads configuration with the documented precedence, reading the process environment.
///
/// # Errors
/// `Config` when an explicitly named file is missing or any present file is not valid TOML.
pub fn load_config(cli: Option<&Path>) -> Result<AppConfig, DbError> {
    load_config_with(cli, |k| std::env::var(k).ok())
}

pub fn load_config_with(
    cli: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, DbError> {
    if let Some(p) = cli
        && !p.exists()
    {
        return Err(DbError::Config(format!("config file not found: {}", p.display())));
    }
    let mut cfg = AppConfig::default();
    for p in config_paths(cli, &lookup) {
        if p.is_file() {
            log::debug!("reading config {}", p.display());
            cfg.merge_missing(AppConfig::from_file(&p)?);
        }
    }
    cfg.apply_env(&lookup);
    Ok(cfg)
}
