//! Cross-thread bridge between the connection loop and the presentation layer.
//!
//! [`channel`] returns the two ends:
//!
//! - [`ConsoleBridge`] stays with the presentation layer. It submits commands and
//!   autocomplete queries and drains delivered messages on its own tick.
//! - [`BridgeLink`] moves into the connection loop. It delivers messages, publishes
//!   autocomplete snapshots and the connection state, and picks up pending input.
//!
//! # Delivery
//!
//! - Messages go through a bounded channel, so a flood from the host waits for
//!   the presentation layer instead of growing without limit. Order is preserved.
//! - Autocomplete results and the connection state are published as immutable
//!   snapshots; readers always see the latest one and never block the writer.
//! - Commands and queries use at-most-one-pending slots: a newer submission
//!   overwrites one the loop has not sent yet.

mod pending;
mod surface;

pub use surface::RenderingSurface;

use crate::codec::MAX_COMMAND_LEN;
use crate::error::bridge::BridgeError;

use pending::PendingSlot;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use models::{AutocompleteBuffer, ConnectionState, ConsoleMessage};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

/// Default number of undelivered messages held before the loop waits.
pub const DEFAULT_MESSAGE_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct Shared {
    pending_command: PendingSlot,
    pending_autocomplete: PendingSlot,
    discarded_frames: AtomicU64,
}

/// Create a connected bridge pair holding up to `capacity` undelivered messages.
pub fn channel(capacity: usize) -> (ConsoleBridge, BridgeLink) {
    let shared = Arc::new(Shared::default());
    let (message_tx, message_rx) = mpsc::channel(capacity.max(1));
    let (autocomplete_tx, autocomplete_rx) = watch::channel(Arc::new(AutocompleteBuffer::empty()));
    let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

    let bridge = ConsoleBridge {
        input: CommandSink {
            shared: Arc::clone(&shared),
        },
        messages: message_rx,
        autocomplete: autocomplete_rx,
        state: state_rx,
    };

    let link = BridgeLink {
        shared,
        messages: message_tx,
        autocomplete: autocomplete_tx,
        state: state_tx,
    };

    (bridge, link)
}

/// Input half of the bridge, cloneable so a separate input reader can own one.
#[derive(Debug, Clone)]
pub struct CommandSink {
    shared: Arc<Shared>,
}

impl CommandSink {
    /// Record `text` as the next command to send, replacing any unsent one.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InputTooLong`] if `text` exceeds 255 bytes; the
    /// wire length prefix is a single byte and commands are never truncated.
    #[track_caller]
    pub fn submit_command(&self, text: &str) -> Result<(), BridgeError> {
        check_length(text)?;
        if let Some(replaced) = self.shared.pending_command.replace(text.to_string()) {
            debug!("Replaced unsent command '{replaced}'");
        }
        Ok(())
    }

    /// Record `text` as the next autocomplete query, replacing any unsent one.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InputTooLong`] if `text` exceeds 255 bytes.
    #[track_caller]
    pub fn request_autocomplete_update(&self, text: &str) -> Result<(), BridgeError> {
        check_length(text)?;
        self.shared.pending_autocomplete.replace(text.to_string());
        Ok(())
    }
}

/// Presentation-side end of the bridge.
pub struct ConsoleBridge {
    input: CommandSink,
    messages: mpsc::Receiver<ConsoleMessage>,
    autocomplete: watch::Receiver<Arc<AutocompleteBuffer>>,
    state: watch::Receiver<ConnectionState>,
}

impl ConsoleBridge {
    /// See [`CommandSink::submit_command`].
    #[track_caller]
    pub fn submit_command(&self, text: &str) -> Result<(), BridgeError> {
        self.input.submit_command(text)
    }

    /// See [`CommandSink::request_autocomplete_update`].
    #[track_caller]
    pub fn request_autocomplete_update(&self, text: &str) -> Result<(), BridgeError> {
        self.input.request_autocomplete_update(text)
    }

    pub fn command_sink(&self) -> CommandSink {
        self.input.clone()
    }

    /// Next delivered message, without waiting.
    pub fn try_next_message(&mut self) -> Option<ConsoleMessage> {
        self.messages.try_recv().ok()
    }

    /// Every message delivered so far, in arrival order.
    pub fn drain_messages(&mut self) -> Vec<ConsoleMessage> {
        let mut drained = Vec::new();
        while let Some(message) = self.try_next_message() {
            drained.push(message);
        }
        drained
    }

    /// Wait for the next message; `None` once the connection loop is gone and
    /// everything it sent has been read.
    pub async fn next_message(&mut self) -> Option<ConsoleMessage> {
        self.messages.recv().await
    }

    /// Latest autocomplete snapshot.
    pub fn autocomplete_snapshot(&self) -> Arc<AutocompleteBuffer> {
        Arc::clone(&self.autocomplete.borrow())
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Frames dropped because they were malformed or carried an unknown tag.
    pub fn discarded_frames(&self) -> u64 {
        self.input.shared.discarded_frames.load(Ordering::Relaxed)
    }

    /// Forward pending messages and a changed autocomplete snapshot to `surface`.
    ///
    /// Returns the number of messages forwarded.
    pub fn pump(&mut self, surface: &mut impl RenderingSurface) -> usize {
        let mut forwarded = 0;
        while let Some(message) = self.try_next_message() {
            surface.on_log(message);
            forwarded += 1;
        }

        if matches!(self.autocomplete.has_changed(), Ok(true)) {
            let snapshot = Arc::clone(&self.autocomplete.borrow_and_update());
            surface.set_autocomplete_buffer(AutocompleteBuffer::clone(&snapshot));
        }

        forwarded
    }
}

/// Connection-loop end of the bridge.
pub struct BridgeLink {
    shared: Arc<Shared>,
    messages: mpsc::Sender<ConsoleMessage>,
    autocomplete: watch::Sender<Arc<AutocompleteBuffer>>,
    state: watch::Sender<ConnectionState>,
}

impl BridgeLink {
    /// Deliver one message, waiting while the presentation layer is behind.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the presentation side has been dropped.
    pub async fn on_message(&self, message: ConsoleMessage) -> Result<(), BridgeError> {
        self.messages
            .send(message)
            .await
            .map_err(|_| BridgeError::Closed {
                message: "Presentation layer dropped its bridge".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Deliver one message only if there is room right now.
    pub fn try_on_message(&self, message: ConsoleMessage) -> bool {
        match self.messages.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) | Err(TrySendError::Closed(dropped)) => {
                debug!("Dropped undeliverable message: {}", dropped.text());
                false
            }
        }
    }

    /// Replace the presentation layer's autocomplete buffer.
    pub fn on_autocomplete_result(&self, buffer: AutocompleteBuffer) {
        self.autocomplete.send_replace(Arc::new(buffer));
    }

    pub fn publish_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    pub fn take_pending_command(&self) -> Option<String> {
        self.shared.pending_command.take()
    }

    pub fn take_pending_autocomplete(&self) -> Option<String> {
        self.shared.pending_autocomplete.take()
    }

    pub fn record_discarded_frame(&self) -> u64 {
        self.shared.discarded_frames.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn is_closed(&self) -> bool {
        self.messages.is_closed()
    }
}

#[track_caller]
fn check_length(text: &str) -> Result<(), BridgeError> {
    if text.len() > MAX_COMMAND_LEN {
        return Err(BridgeError::InputTooLong {
            length: text.len(),
            max: MAX_COMMAND_LEN,
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(())
}
