//! Startup, the presentation loop and shutdown sequencing.

use crate::console::{BANNER, OperatorInput, PlainConsole, SHUTDOWN_LINE, invalid_command_line};
use crate::error::DevConsoleError;

use console_core::bridge::{self, ConsoleBridge, RenderingSurface};
use console_core::config::ConsoleConfig;
use console_core::session::{SessionClock, SessionHandle, start_session};
use console_core::transport::EnetTransport;

use common::ErrorLocation;

use std::io::Write;
use std::panic::Location;
use std::path::PathBuf;

use log::{debug, error, info, warn};
use models::ConsoleMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::sleep as TokioSleep;

const APP_DIR_NAME: &str = "devconsole";

/// Directory for `devconsole.log`: the platform's local data dir, else the temp dir.
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

/// Load the config from `config_dir` and apply environment overrides.
///
/// An unreadable or invalid file is logged and replaced by defaults.
///
/// # Errors
///
/// Returns [`DevConsoleError::Config`] if an environment override is unusable.
pub fn load_config(config_dir: Option<PathBuf>) -> Result<ConsoleConfig, DevConsoleError> {
    let mut config = match config_dir {
        Some(dir) => ConsoleConfig::load(&dir).unwrap_or_else(|e| {
            warn!("Falling back to default config: {e}");
            ConsoleConfig::default()
        }),
        None => {
            warn!("No config directory on this platform, using defaults");
            ConsoleConfig::default()
        }
    };

    config
        .apply_env_overrides()
        .map_err(|e| DevConsoleError::Config {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(config)
}

/// Run the console until the operator quits, input ends or the session stops.
///
/// # Errors
///
/// - [`DevConsoleError::Startup`] if no transport can be created for the configured host
/// - [`DevConsoleError::Session`] if the connection loop ended with an error
/// - [`DevConsoleError::DevConsole`] if reading operator input fails
pub async fn run<R, W>(config: &ConsoleConfig, input: R, output: W) -> Result<W, DevConsoleError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let clock = SessionClock::init();
    let mut console = PlainConsole::new(output);

    let transport = EnetTransport::new(&config.endpoint()).map_err(|e| {
        error!("Cannot create transport: {e}");
        DevConsoleError::Startup {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let (mut bridge, link) = bridge::channel(config.ui.message_capacity);
    for line in BANNER {
        console_line(&mut console, line, &clock);
    }

    info!("Starting console session for {}", config.endpoint());
    let handle = start_session(transport, link, config.session_settings(), clock);

    let input_result =
        presentation_loop(config, input, &mut bridge, &mut console, &handle, &clock).await;

    let session_result = handle.shutdown().await;
    bridge.pump(&mut console);
    console_line(&mut console, SHUTDOWN_LINE, &clock);

    input_result?;
    session_result.map_err(|e| DevConsoleError::Session {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(console.into_inner())
}

async fn presentation_loop<R, W>(
    config: &ConsoleConfig,
    input: R,
    bridge: &mut ConsoleBridge,
    console: &mut PlainConsole<W>,
    handle: &SessionHandle,
    clock: &SessionClock,
) -> Result<(), DevConsoleError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        let interval = config.ui.poll_interval(bridge.connection_state());

        tokio::select! {
            _ = TokioSleep(interval) => {}
            line = lines.next_line() => {
                let line = line.map_err(|e| DevConsoleError::DevConsole {
                    message: format!("Failed to read operator input: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

                let Some(line) = line else {
                    debug!("Operator input closed");
                    return Ok(());
                };

                if !handle_input(&line, bridge, console, clock) {
                    return Ok(());
                }
            }
        }

        bridge.pump(console);

        if handle.is_finished() {
            warn!("Console session ended on its own");
            return Ok(());
        }
    }
}

/// Returns `false` when the operator asked to quit.
fn handle_input<W: Write>(
    line: &str,
    bridge: &ConsoleBridge,
    console: &mut PlainConsole<W>,
    clock: &SessionClock,
) -> bool {
    match OperatorInput::parse(line) {
        OperatorInput::Quit => {
            info!("Operator requested quit");
            return false;
        }
        OperatorInput::Empty => {}
        OperatorInput::Invalid(text) => {
            console_line(console, &invalid_command_line(&text), clock);
        }
        OperatorInput::Command(command) => {
            if let Err(e) = bridge.submit_command(&command) {
                warn!("Rejected command: {e}");
                console_line(console, &invalid_command_line(&command), clock);
            }
        }
        OperatorInput::Autocomplete(query) => match bridge.request_autocomplete_update(&query) {
            Ok(()) => console.expect_autocomplete(),
            Err(e) => {
                warn!("Rejected autocomplete query: {e}");
                console_line(console, &invalid_command_line(&query), clock);
            }
        },
    }
    true
}

fn console_line<W: Write>(console: &mut PlainConsole<W>, text: &str, clock: &SessionClock) {
    console.on_log(ConsoleMessage::status(text, clock.elapsed_seconds()));
}
