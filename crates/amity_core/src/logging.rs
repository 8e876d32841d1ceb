//! Optional file logging for `amity` runs.
//!
//! Logging stays off unless the operator names a log directory. Lines carry
//! ids, kinds and counts; person names only ever reach the log through a
//! panic payload, which is flattened and capped first.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "amity";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 3;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    config: LogConfig,
    _handle: LoggerHandle,
}

/// Failure to set up file logging.
#[derive(Debug)]
pub enum LoggingError {
    /// A level was given but no directory to log into.
    LevelWithoutDirectory,
    /// The level is not a `log` level name.
    InvalidLevel(String),
    /// The working directory needed to resolve a relative path is unreadable.
    WorkingDirectory(std::io::Error),
    /// The log directory could not be created.
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The `flexi_logger` backend refused to start.
    Backend(flexi_logger::FlexiLoggerError),
    /// Logging already runs with another level or directory.
    AlreadyActive { level: LevelFilter, dir: PathBuf },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LevelWithoutDirectory => {
                write!(f, "a log level was given without a log directory")
            }
            Self::InvalidLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected off|error|warn|info|debug|trace"
            ),
            Self::WorkingDirectory(err) => {
                write!(f, "cannot resolve relative log directory: {err}")
            }
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyActive { level, dir } => write!(
                f,
                "logging already active at level {level} in `{}`",
                dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WorkingDirectory(err) => Some(err),
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Resolved logging request: a level and an absolute directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    level: LevelFilter,
    dir: PathBuf,
}

impl LogConfig {
    /// Builds a config from the operator's `--log-level` / `--log-dir` values.
    ///
    /// Returns `Ok(None)` when neither is set. A relative directory is
    /// resolved against the working directory; a missing level falls back
    /// to [`default_log_level`].
    pub fn from_options(
        level: Option<&str>,
        dir: Option<&Path>,
    ) -> Result<Option<Self>, LoggingError> {
        let Some(dir) = dir else {
            return match level {
                Some(_) => Err(LoggingError::LevelWithoutDirectory),
                None => Ok(None),
            };
        };

        let level = match level {
            Some(raw) => parse_level(raw)?,
            None => default_log_level(),
        };
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(LoggingError::WorkingDirectory)?
                .join(dir)
        };
        Ok(Some(Self { level, dir }))
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `Debug` in debug builds, `Info` in release builds.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Starts rotating file logs for this process.
///
/// Calling again with an equal config is a no-op; a different config is
/// rejected with [`LoggingError::AlreadyActive`].
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start_backend(config))?;
    if active.config != *config {
        return Err(LoggingError::AlreadyActive {
            level: active.config.level,
            dir: active.config.dir.clone(),
        });
    }
    Ok(())
}

fn start_backend(config: &LogConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.dir).map_err(|source| LoggingError::CreateDirectory {
        path: config.dir.clone(),
        source,
    })?;

    let spec = config.level.as_str().to_ascii_lowercase();
    let handle = Logger::try_with_str(&spec)
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(config.dir.as_path())
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
        .start()
        .map_err(LoggingError::Backend)?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok version={} level={spec}",
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        config: config.clone(),
        _handle: handle,
    })
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("warning") {
        return Ok(LevelFilter::Warn);
    }
    LevelFilter::from_str(trimmed).map_err(|_| LoggingError::InvalidLevel(trimmed.to_string()))
}

// Runs once: only reached from the `ACTIVE` initializer.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error location={location} payload={}",
            single_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

fn single_line(text: &str, limit: usize) -> String {
    let mut out: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(limit)
        .collect();
    if text.chars().count() > limit {
        out.push_str("...");
    }
    out
}
