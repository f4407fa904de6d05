//! Domain models for the developer console.
//!
//! This crate contains pure data structures representing what travels between
//! the host connection and the operator. Models have no I/O - they're just data
//! that can be passed across threads and layers.
//!
//! ## Architecture
//!
//! - **models** (this crate): Pure data structures
//! - **console-core**: Wire protocol and connection logic producing these models
//! - **devconsole**: Application presenting them to the operator

pub mod autocomplete;
pub mod connection_state;
pub mod console_message;
pub mod error;
pub mod severity;

pub use autocomplete::{AutocompleteBuffer, AutocompleteEntry};
pub use common::ErrorLocation;
pub use connection_state::ConnectionState;
pub use console_message::ConsoleMessage;
pub use error::model_error::ModelError;
pub use severity::Severity;

#[cfg(test)]
mod tests;
