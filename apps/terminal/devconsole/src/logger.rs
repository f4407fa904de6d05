//! Logging for the developer console.
//!
//! Always writes a plain log file. Stdout carries the console itself, so the
//! colored stdout sink is opt-in through `DEVCONSOLE_LOG_STDOUT`.

use crate::error::DevConsoleError;

use common::ErrorLocation;

use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

/// Thread-safe initialization guard.
static INIT_LOGGER_ONCE: Once = Once::new();

/// Tracks if logger initialization was already attempted.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "devconsole.log";

/// Set to any value to mirror log records to stdout.
pub const ENV_LOG_STDOUT: &str = "DEVCONSOLE_LOG_STDOUT";

const LOGGER_INITIALIZED_MESSAGE_PREFIX: &str = "Logger initialized with level: ";
const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Initialize the global logger writing to `{log_dir}/devconsole.log`.
///
/// Safe to call multiple times; only the first call installs a logger, later
/// calls log a warning and return Ok.
///
/// # Errors
///
/// Returns [`DevConsoleError::DevConsole`] if the log file cannot be created
/// or another logger is already installed.
pub fn initialize(log_dir: &Path) -> Result<(), DevConsoleError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        let with_stdout = std::env::var_os(ENV_LOG_STDOUT).is_some();
        result = build_dispatch(log_dir, with_stdout).and_then(apply);
        if result.is_ok() {
            info!("{LOGGER_INITIALIZED_MESSAGE_PREFIX}{LOG_LEVEL:?}");
        }
    });

    result
}

/// Assemble the file sink and, if requested, the colored stdout sink.
#[track_caller]
pub(crate) fn build_dispatch(log_dir: &Path, with_stdout: bool) -> Result<Dispatch, DevConsoleError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let file_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0)
            ))
        })
        .chain(
            fern::log_file(&log_file_path).map_err(|e| DevConsoleError::DevConsole {
                message: format!("Failed to create log file {}: {e}", log_file_path.display()),
                location: ErrorLocation::from(Location::caller()),
            })?,
        );

    let mut dispatch = Dispatch::new().level(LOG_LEVEL).chain(file_dispatch);

    if with_stdout {
        let color_configuration = ColoredLevelConfig::new()
            .debug(Blue)
            .info(Green)
            .warn(Yellow)
            .error(Red)
            .trace(Magenta);

        dispatch = dispatch.chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{date} - {level}] {message} [{file}:{line}]",
                        date = format_rfc3339(SystemTime::now()),
                        level = color_configuration.color(record.level()),
                        file = record.file().unwrap_or("unknown"),
                        line = record.line().unwrap_or(0),
                    ))
                })
                .chain(stdout()),
        );
    }

    Ok(dispatch)
}

#[track_caller]
fn apply(dispatch: Dispatch) -> Result<(), DevConsoleError> {
    dispatch.apply().map_err(|e| DevConsoleError::DevConsole {
        message: format!("Failed to initialize logger: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
