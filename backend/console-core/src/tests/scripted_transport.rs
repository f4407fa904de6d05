// In-memory transport driven by a script, for exercising the connection loop
// without a network.

use crate::error::transport::TransportError;
use crate::transport::{Transport, TransportEvent};

use common::ErrorLocation;

use std::collections::VecDeque;
use std::panic::Location;
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    /// Results handed out by successive `connect` calls; an empty script refuses.
    pub connect_results: VecDeque<Result<(), TransportError>>,
    /// One batch of events per `poll_events` call.
    pub inbound: VecDeque<Vec<TransportEvent>>,
    /// Results handed out by successive `send` calls; an empty script succeeds.
    pub send_results: VecDeque<Result<(), TransportError>>,
    pub sent: Vec<Vec<u8>>,
    pub connected: bool,
    pub connect_attempts: usize,
    pub resets: usize,
    pub drains: usize,
}

impl ScriptedTransport {
    pub(crate) fn accepting() -> Self {
        let mut transport = Self::default();
        transport.connect_results.push_back(Ok(()));
        transport
    }

    pub(crate) fn push_frames(&mut self, frames: Vec<Vec<u8>>) {
        self.inbound
            .push_back(frames.into_iter().map(TransportEvent::Receive).collect());
    }
}

#[track_caller]
pub(crate) fn refused() -> TransportError {
    TransportError::Connect {
        message: "connection refused".to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

impl Transport for ScriptedTransport {
    fn address(&self) -> &str {
        "scripted:23005"
    }

    fn has_peer(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self, _timeout: Duration) -> Result<(), TransportError> {
        self.connect_attempts += 1;
        let result = self.connect_results.pop_front().unwrap_or_else(|| Err(refused()));
        self.connected = result.is_ok();
        result
    }

    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        let result = self.send_results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.sent.push(frame);
        }
        result
    }

    async fn poll_events(&mut self, _timeout: Duration) -> Vec<TransportEvent> {
        self.inbound.pop_front().unwrap_or_default()
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.connected = false;
    }

    async fn disconnect_and_drain(&mut self, _rounds: u32, _per_round: Duration) {
        self.drains += 1;
        self.connected = false;
    }
}
