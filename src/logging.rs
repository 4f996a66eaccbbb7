//! File logging bootstrap.
//!
//! Logs go to a size-rotated file under the configured directory. The
//! terminal belongs to the TUI, so nothing is written to stderr once the
//! logger runs.
//!
//! Initialization is idempotent for the same directory and level; asking for
//! a different directory or level after startup is rejected.
//!
//! Records are buffered. Call `flush` before the process exits.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "tdl";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    logger: LoggerHandle,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Unsupported log level '{0}' (expected trace|debug|info|warn|error|off)")]
    InvalidLevel(String),
    #[error("Failed to create log directory {path}: {reason}")]
    DirectoryError { path: PathBuf, reason: String },
    #[error("Failed to start logger: {0}")]
    StartError(#[from] flexi_logger::FlexiLoggerError),
    #[error("Logging already initialized with {current}; refusing to switch to {requested}")]
    AlreadyInitialized { current: String, requested: String },
}

/// Start file logging at `level` under `log_dir`
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING_STATE.get() {
        return check_same(state, level, log_dir);
    }

    std::fs::create_dir_all(log_dir).map_err(|e| LoggingError::DirectoryError {
        path: log_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let logger = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    let state = LOGGING_STATE.get_or_init(|| LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        logger,
    });
    log::info!(
        "logging started level={} dir={} version={}",
        state.level,
        state.log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

/// Write out buffered log records. Does nothing before `init_logging`.
pub fn flush() {
    if let Some(state) = LOGGING_STATE.get() {
        state.logger.flush();
    }
}

fn check_same(state: &LoggingState, level: &'static str, log_dir: &Path) -> Result<(), LoggingError> {
    if state.log_dir != log_dir {
        return Err(LoggingError::AlreadyInitialized {
            current: state.log_dir.display().to_string(),
            requested: log_dir.display().to_string(),
        });
    }
    if state.level != level {
        return Err(LoggingError::AlreadyInitialized {
            current: state.level.to_string(),
            requested: level.to_string(),
        });
    }
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        _ => Err(LoggingError::InvalidLevel(level.to_string())),
    }
}
