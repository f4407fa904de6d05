//! Transport session: one outbound connection to the host.
//!
//! The connection loop only needs a handful of operations with bounded
//! timeouts, captured by [`Transport`]. [`EnetTransport`] carries each frame
//! as one reliable packet on an ENet connection, which is ordered delivery on
//! top of UDP datagrams and what the host listens for.

mod enet;

pub use enet::EnetTransport;

use crate::error::transport::TransportError;

use std::future::Future;
use std::time::Duration;

/// Something that happened on the connection since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One complete frame from the host.
    Receive(Vec<u8>),
    /// The peer went away, gracefully or not.
    Disconnect,
}

/// A single peer connection owned by the connection loop.
///
/// Methods are called from one task only; none of them block past the timeout
/// they are given.
pub trait Transport: Send {
    /// Human-readable `host:port` for status lines.
    fn address(&self) -> &str;

    /// Whether a peer handle currently exists.
    fn has_peer(&self) -> bool;

    /// Open the connection, waiting at most `timeout` for the host to accept.
    ///
    /// [`TransportError::HostCreate`] means the transport can never work and
    /// must not be retried.
    fn connect(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Queue one frame for reliable delivery. Never waits on the host.
    fn send(&mut self, frame: Vec<u8>) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Every event that is available now, waiting up to `timeout` for the
    /// first one. An empty result means the wait timed out.
    fn poll_events(&mut self, timeout: Duration) -> impl Future<Output = Vec<TransportEvent>> + Send;

    /// Drop the current peer handle without notifying the host.
    fn reset(&mut self);

    /// Tell the host we are leaving, then keep servicing the connection for
    /// `rounds` polls of `per_round` each so in-flight acknowledgements settle.
    fn disconnect_and_drain(
        &mut self,
        rounds: u32,
        per_round: Duration,
    ) -> impl Future<Output = ()> + Send;
}
