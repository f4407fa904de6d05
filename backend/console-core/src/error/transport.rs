use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Host Create Error: {message} {location}")]
    HostCreate {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect Timeout Error: {message} {location}")]
    ConnectTimeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Service Error: {message} {location}")]
    Service {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not Connected Error: {message} {location}")]
    NotConnected {
        message: String,
        location: ErrorLocation,
    },
}

impl TransportError {
    /// Only a handle that cannot be created at all stops the client; everything
    /// else is retried on the next connection attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::HostCreate { .. })
    }
}
