//! Shared building blocks for the developer console workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): Cross-cutting helpers used by every layer
//! - **models**: Pure data passed between the transport and the presentation layer
//! - **console-core**: Wire protocol, transport and connection state machine
//! - **devconsole**: Binary wiring everything together
//!
//! Keeping error location tracking here lets every crate report *where* a
//! failure was raised without depending on the core.

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
