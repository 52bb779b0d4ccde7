//! log4rs setup: `app.log` for everything, `audit.log` for collection writes
//! (target `memdoc::audit`), and optionally `trace.log` for per-operation trace lines.

use crate::errors::DbError;
use log::LevelFilter;
use log4rs::Handle;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

static HANDLE: Mutex<Option<Handle>> = Mutex::new(None);

/// Parameters for `configure_logging`.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub dir: Option<PathBuf>,
    /// error|warn|info|debug|trace; anything else means info
    pub level: Option<String>,
    /// Number of rolled files to keep (default 7).
    pub retention: Option<u32>,
    pub trace: bool,
}

impl LogSettings {
    /// Reads `MEMDOC_LOG_DIR`, `MEMDOC_LOG_LEVEL`, `MEMDOC_LOG_RETENTION` and
    /// `MEMDOC_TRACE` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            dir: lookup("MEMDOC_LOG_DIR").map(PathBuf::from),
            level: lookup("MEMDOC_LOG_LEVEL"),
            retention: lookup("MEMDOC_LOG_RETENTION").and_then(|s| s.parse().ok()),
            trace: lookup("MEMDOC_TRACE")
                .is_some_and(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        }
    }
}

pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, DbError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)
        .map_err(|e| DbError::Io(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))
        .map_err(|e| DbError::Io(e.to_string()))
}

/// Builds the log4rs configuration for `settings` without installing it.
pub fn build_config(settings: &LogSettings) -> Result<Config, DbError> {
    let base = match &settings.dir {
        Some(d) => d.clone(),
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&base)?;
    let keep = settings.retention.unwrap_or(7);
    let lvl = parse_level(settings.level.as_deref());

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build("memdoc::audit", lvl));
    builder = if settings.trace {
        builder
            .appender(Appender::builder().build("trace", Box::new(rolling(&base, "trace", keep)?)))
            .logger(
                Logger::builder()
                    .appender("trace")
                    .additive(false)
                    .build(super::tracelog::TRACE_TARGET, LevelFilter::Trace),
            )
    } else {
        builder.logger(Logger::builder().additive(false).build(super::tracelog::TRACE_TARGET, LevelFilter::Off))
    };
    builder
        .build(Root::builder().appender("app").build(lvl))
        .map_err(|e| DbError::Config(e.to_string()))
}

/// Installs (or replaces) the process-wide logging configuration.
pub fn configure_logging(settings: &LogSettings) -> Result<(), DbError> {
    let config = build_config(settings)?;
    let mut handle = HANDLE.lock();
    match handle.as_ref() {
        Some(h) => h.set_config(config),
        None => {
            let h = log4rs::init_config(config).map_err(|e| DbError::Config(e.to_string()))?;
            *handle = Some(h);
        }
    }
    Ok(())
}

/// Configures logging from `MEMDOC_*` environment variables.
pub fn configure_from_env() -> Result<(), DbError> {
    configure_logging(&LogSettings::from_lookup(|k| std::env::var(k).ok()))
}

/// Initializes logging from a log4rs YAML file.
pub fn init_path(path: &Path) -> Result<(), DbError> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())
        .map_err(|e| DbError::Config(e.to_string()))
}
