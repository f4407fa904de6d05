//! Client side of the remote developer console.
//!
//! A spawned [`session`] task owns one [`transport`] connection to the host,
//! turns [`codec`] frames into console messages and hands them to the
//! presentation layer through the [`bridge`].

pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_ENDPOINT, DEFAULT_HOST_ADDRESS, DEFAULT_HOST_PORT};
