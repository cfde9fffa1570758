//! Process-wide file logging for the notification center.
//!
//! # Responsibility
//! - Start one size-rotated `flexi_logger` backend under a caller-chosen
//!   directory.
//! - Record panics as one capped `event=panic_captured` line.
//!
//! # Invariants
//! - The first successful [`init_logging`] fixes the settings for the
//!   process; a repeat with equal settings is a no-op, any other is a
//!   [`LoggingError::Conflict`].
//! - Notification titles and messages are never logged on purpose. Panic
//!   payloads may still quote them, so they are flattened and capped.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "notifycenter";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEPT_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Logging bootstrap failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    CreateDirectory { dir: PathBuf, message: String },
    Backend(String),
    /// Logging already runs with different settings.
    Conflict {
        active: LogSettings,
        requested: LogSettings,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "invalid log_dir: {message}"),
            Self::CreateDirectory { dir, message } => write!(
                f,
                "failed to create log directory `{}`: {message}",
                dir.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already initialized as {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {}

pub type LoggingResult<T> = Result<T, LoggingError>;

/// Validated level and absolute log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub log_dir: PathBuf,
}

impl LogSettings {
    /// Parses a case-insensitive level (`warning` is accepted for `warn`)
    /// and an absolute directory.
    pub fn parse(level: &str, log_dir: &str) -> LoggingResult<Self> {
        let raw_level = level.trim().to_ascii_lowercase();
        let alias = if raw_level == "warning" {
            "warn"
        } else {
            raw_level.as_str()
        };
        let level = match LevelFilter::from_str(alias) {
            Ok(LevelFilter::Off) | Err(_) => return Err(LoggingError::UnsupportedLevel(raw_level)),
            Ok(level) => level,
        };

        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err(LoggingError::InvalidDirectory("cannot be empty".to_string()));
        }
        let log_dir = Path::new(trimmed);
        if !log_dir.is_absolute() {
            return Err(LoggingError::InvalidDirectory(format!(
                "must be an absolute path, got `{trimmed}`"
            )));
        }
        Ok(Self {
            level,
            log_dir: log_dir.to_path_buf(),
        })
    }

    fn spec(&self) -> String {
        self.level.as_str().to_ascii_lowercase()
    }
}

impl Display for LogSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "level `{}` at `{}`", self.spec(), self.log_dir.display())
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts file logging once per process.
///
/// # Errors
/// - `UnsupportedLevel` / `InvalidDirectory` for bad input.
/// - `CreateDirectory` / `Backend` when the backend cannot start.
/// - `Conflict` when logging already runs with other settings.
pub fn init_logging(level: &str, log_dir: &str) -> LoggingResult<()> {
    let requested = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start_backend(&requested))?;
    if active.settings != requested {
        return Err(LoggingError::Conflict {
            active: active.settings.clone(),
            requested,
        });
    }
    Ok(())
}

/// Settings of the running logger, if any.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE.get().map(|active| active.settings.clone())
}

fn start_backend(settings: &LogSettings) -> LoggingResult<ActiveLogger> {
    std::fs::create_dir_all(&settings.log_dir).map_err(|err| LoggingError::CreateDirectory {
        dir: settings.log_dir.clone(),
        message: err.to_string(),
    })?;

    let handle = Logger::try_with_str(settings.spec())
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEPT_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=core_init module=core status=ok platform={} debug_build={} version={} level={}",
        std::env::consts::OS,
        cfg!(debug_assertions),
        env!("CARGO_PKG_VERSION"),
        settings.spec()
    );
    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    PANIC_HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info.location().map_or_else(
                || "unknown".to_string(),
                |loc| format!("{}:{}", loc.file(), loc.line()),
            );
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| {
                    panic_info
                        .payload()
                        .downcast_ref::<String>()
                        .map(String::as_str)
                })
                .unwrap_or("non-string panic payload");
            error!(
                "event=panic_captured module=core status=error location={location} payload={}",
                one_line(payload, PANIC_PAYLOAD_LIMIT)
            );
            previous(panic_info);
        }));
    });
}

/// Collapses whitespace runs to single spaces, drops control characters
/// and caps the result at `limit` chars (plus `...`).
fn one_line(value: &str, limit: usize) -> String {
    let mut flattened = value.split_whitespace().collect::<Vec<_>>().join(" ");
    flattened.retain(|ch| !ch.is_control());
    if flattened.chars().count() <= limit {
        return flattened;
    }
    let mut capped = flattened.chars().take(limit).collect::<String>();
    capped.push_str("...");
    capped
}
