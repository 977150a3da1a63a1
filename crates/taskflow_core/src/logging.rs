//! Process-wide logging for TaskFlow binaries.
//!
//! Records are single `key=value` lines (`event=... module=... status=...`)
//! written through `flexi_logger`, either to stderr or to a size-rotated file
//! set. Task text, passwords and session tokens never appear in them.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Once;

const LOG_FILE_BASENAME: &str = "taskflow";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_MESSAGE_MAX_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// `debug` in debug builds, `info` in release builds.
    pub fn default_for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Info
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LoggingError::UnknownLevel(value.trim().to_string())),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Absolute directory holding `taskflow*.log` files.
    Directory(PathBuf),
}

impl LogTarget {
    pub fn directory(raw: &str) -> Result<Self, LoggingError> {
        let dir = raw.trim();
        if dir.is_empty() {
            return Err(LoggingError::InvalidDirectory {
                dir: dir.to_string(),
                reason: "must not be empty",
            });
        }
        let path = PathBuf::from(dir);
        if !path.is_absolute() {
            return Err(LoggingError::InvalidDirectory {
                dir: dir.to_string(),
                reason: "must be an absolute path",
            });
        }
        Ok(Self::Directory(path))
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Validated logging settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSpec {
    pub level: LogLevel,
    pub target: LogTarget,
}

impl LogSpec {
    /// Parses raw configuration values; `log_dir = None` means stderr.
    pub fn parse(level: &str, log_dir: Option<&str>) -> Result<Self, LoggingError> {
        Ok(Self {
            level: level.parse()?,
            target: log_dir.map_or(Ok(LogTarget::Stderr), LogTarget::directory)?,
        })
    }
}

impl Display for LogSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.level, self.target)
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    InvalidDirectory { dir: String, reason: &'static str },
    CreateDirectory { dir: PathBuf, source: std::io::Error },
    Backend(String),
    /// Logging is already running with different settings.
    AlreadyInitialized { active: LogSpec, requested: LogSpec },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory { dir, reason } => write!(f, "log_dir `{dir}` {reason}"),
            Self::CreateDirectory { dir, source } => write!(
                f,
                "cannot create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Backend(message) => write!(f, "logger backend failed to start: {message}"),
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "logging already running as `{active}`; cannot switch to `{requested}`"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            _ => None,
        }
    }
}

struct ActiveLogger {
    spec: LogSpec,
    _handle: LoggerHandle,
}

/// Starts logging once per process.
///
/// Calling again with the same spec is a no-op; a different spec is an
/// error and leaves the running logger untouched.
pub fn init_logging(spec: &LogSpec) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start(spec))?;
    if &active.spec != spec {
        return Err(LoggingError::AlreadyInitialized {
            active: active.spec.clone(),
            requested: spec.clone(),
        });
    }
    Ok(())
}

/// The running logger's settings, if any.
pub fn logging_status() -> Option<LogSpec> {
    ACTIVE.get().map(|active| active.spec.clone())
}

fn start(spec: &LogSpec) -> Result<ActiveLogger, LoggingError> {
    let backend = |err: flexi_logger::FlexiLoggerError| LoggingError::Backend(err.to_string());
    let logger = Logger::try_with_str(spec.level.as_str()).map_err(backend)?;

    let logger = match &spec.target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
                dir: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };
    let handle = logger.start().map_err(backend)?;

    PANIC_HOOK.call_once(install_panic_logger);
    info!(
        "event=logging_init module=core status=ok version={} os={} level={} target={}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        spec.level,
        spec.target
    );

    Ok(ActiveLogger {
        spec: spec.clone(),
        _handle: handle,
    })
}

fn install_panic_logger() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payloads can echo request bodies.
        let message = one_line(&panic_message(panic_info.payload()), PANIC_MESSAGE_MAX_CHARS);
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!("event=panic module=core status=error location={location} message={message}");
        previous(panic_info);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string payload>".to_string())
}

fn one_line(value: &str, max_chars: usize) -> String {
    let mut line: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(max_chars)
        .collect();
    if value.chars().count() > max_chars {
        line.push_str("...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, one_line, panic_message, LogLevel, LogSpec, LogTarget,
        LoggingError,
    };

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(" INFO ".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(LoggingError::UnknownLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn log_dir_must_be_absolute() {
        let err = LogSpec::parse("info", Some("logs/dev")).unwrap_err();
        assert!(err.to_string().contains("absolute"));
        assert_eq!(
            LogSpec::parse("info", None).unwrap().target,
            LogTarget::Stderr
        );
    }

    #[test]
    fn panic_messages_are_flattened_and_capped() {
        let line = one_line("line1\nline2\rline3", 8);
        assert_eq!(line, "line1 li...");
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&42_u8), "<non-string payload>");
    }

    #[test]
    fn init_is_idempotent_and_rejects_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        let spec = LogSpec::parse("info", Some(dir_str)).unwrap();

        init_logging(&spec).unwrap();
        init_logging(&spec).unwrap();

        let louder = LogSpec::parse("debug", Some(dir_str)).unwrap();
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        let elsewhere = LogSpec::parse("info", None).unwrap();
        assert!(init_logging(&elsewhere).is_err());

        assert_eq!(logging_status(), Some(spec));
    }
}
