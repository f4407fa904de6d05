use common::ErrorLocation;

use thiserror::Error;

/// Errors that end the console process.
///
/// Anything recoverable is handled inside the session; these are startup and
/// teardown failures that map to a non-zero exit.
#[derive(Debug, Error)]
pub enum DevConsoleError {
    /// Error from this App (directories, logger, terminal I/O)
    #[error("DevConsole Error: {message} {location}")]
    DevConsole {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be applied
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// The transport could not be created for the configured host
    #[error("Startup Error: {message} {location}")]
    Startup {
        message: String,
        location: ErrorLocation,
    },

    /// The connection loop ended with an error
    #[error("Session Error: {message} {location}")]
    Session {
        message: String,
        location: ErrorLocation,
    },
}
