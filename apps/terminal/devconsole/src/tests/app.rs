use crate::app::{load_config, run};
use crate::error::DevConsoleError;

use console_core::config::ConsoleConfig;

use std::net::UdpSocket;

use tempfile::TempDir;

/// Config pointing at a localhost port nobody listens on.
fn unreachable_config() -> ConsoleConfig {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("bind");
    let port = socket.local_addr().expect("address").port();
    drop(socket);

    let mut config = ConsoleConfig::default();
    config.host.port = port;
    config.connection.startup_delay_ms = 0;
    config.connection.retry_delay_ms = 10;
    config.connection.connect_timeout_ms = 100;
    config
}

async fn run_with_input(config: &ConsoleConfig, input: &'static str) -> Result<String, DevConsoleError> {
    let output = run(config, input.as_bytes(), Vec::new()).await?;
    Ok(String::from_utf8(output).expect("utf8 output"))
}

/// **VALUE**: Verifies `!quit` ends the console cleanly with banner and goodbye.
///
/// **WHY THIS MATTERS**: Quitting must not wait for a host that never shows up.
///
/// **BUG THIS CATCHES**: Would catch a quit that hangs in the retry loop or
/// skips the shutdown line.
#[tokio::test]
async fn given_quit_command_when_running_then_exits_with_goodbye() {
    // GIVEN
    let config = unreachable_config();

    // WHEN
    let output = run_with_input(&config, "!quit\n").await.expect("clean exit");

    // THEN
    assert!(output.contains("Initialised developer console app"));
    assert!(output.contains("Type '!quit' to quit this console"));
    assert!(output.trim_end().ends_with("Gracefully shutting down..."));
}

/// **VALUE**: Verifies invalid input is reported locally and never sent.
///
/// **WHY THIS MATTERS**: The host cannot parse commands with leading spaces.
///
/// **BUG THIS CATCHES**: Would catch rejected lines being silently dropped.
#[tokio::test]
async fn given_leading_space_line_when_running_then_reports_invalid_command() {
    let config = unreachable_config();

    let output = run_with_input(&config, "   map dm1\n!quit\n")
        .await
        .expect("clean exit");

    assert!(output.contains("$yInvalid command: '   map dm1'"));
}

/// **VALUE**: Verifies closed input behaves like quitting.
///
/// **WHY THIS MATTERS**: When stdin is piped, end of input must not leave the
/// console running forever.
///
/// **BUG THIS CATCHES**: Would catch a loop spinning on repeated EOF.
#[tokio::test]
async fn given_empty_input_when_running_then_exits_cleanly() {
    let config = unreachable_config();

    let output = run_with_input(&config, "").await.expect("clean exit");

    assert!(output.contains("Gracefully shutting down..."));
}

/// **VALUE**: Verifies an unusable host address is a startup error.
///
/// **WHY THIS MATTERS**: The binary must exit non-zero instead of retrying an
/// address that can never work.
///
/// **BUG THIS CATCHES**: Would catch HostCreate being swallowed.
#[tokio::test]
async fn given_unusable_host_when_running_then_returns_startup_error() {
    let mut config = unreachable_config();
    config.host.address = "bad host".to_string();

    let result = run_with_input(&config, "!quit\n").await;

    assert!(matches!(result, Err(DevConsoleError::Startup { .. })));
}

/// **VALUE**: Verifies a corrupt config file falls back to defaults.
///
/// **WHY THIS MATTERS**: A bad edit must not stop the console from starting.
///
/// **BUG THIS CATCHES**: Would catch load errors being propagated as fatal.
#[test]
fn given_corrupt_config_when_loaded_then_uses_defaults() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("config.json"), "not json").expect("write");

    let config = load_config(Some(dir.path().to_path_buf())).expect("defaults");

    assert_eq!(config.host, ConsoleConfig::default().host);
}
