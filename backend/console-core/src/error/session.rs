use crate::error::transport::TransportError;

use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("Fatal Transport Error: {message} {location}")]
    FatalTransport {
        message: String,
        location: ErrorLocation,
        #[source]
        source: TransportError,
    },

    #[error("Presentation Closed Error: {message} {location}")]
    PresentationClosed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Join Error: {message} {location}")]
    Join {
        message: String,
        location: ErrorLocation,
    },
}
