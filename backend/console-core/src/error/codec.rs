use common::ErrorLocation;

use std::panic::Location;

use models::ModelError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("Truncated Frame Error: {message} {location}")]
    TruncatedFrame {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unknown Frame Error: tag 0x{tag:02X} {location}")]
    UnknownFrame { tag: u8, location: ErrorLocation },

    #[error("Invalid Severity Error: {message} {location}")]
    InvalidSeverity {
        message: String,
        location: ErrorLocation,
    },

    #[error("Command Too Long Error: {length} bytes exceeds {max} {location}")]
    CommandTooLong {
        length: usize,
        max: usize,
        location: ErrorLocation,
    },

    #[error("Payload Too Long Error: {message} {location}")]
    PayloadTooLong {
        message: String,
        location: ErrorLocation,
    },
}

impl CodecError {
    /// Protocol errors are dropped by the connection loop; encode errors are the
    /// caller's fault and never reach the wire.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            CodecError::TruncatedFrame { .. }
                | CodecError::UnknownFrame { .. }
                | CodecError::InvalidSeverity { .. }
        )
    }
}

impl From<ModelError> for CodecError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        CodecError::InvalidSeverity {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
