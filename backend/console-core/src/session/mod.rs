//! Connection state machine.
//!
//! One [`ConsoleSession`] drives one [`Transport`] through
//! `Connecting → Connected → Disconnecting → Connecting` until shutdown is
//! requested, at which point it performs a last graceful disconnect and ends in
//! `Inactive`.
//!
//! | State | Each iteration |
//! |---|---|
//! | Connecting | announce the attempt, connect; on failure reset and wait the retry delay |
//! | Connected | send pending input, drain events, deliver decoded messages |
//! | Disconnecting | graceful disconnect and drain, then back to Connecting |
//!
//! The retry cadence is fixed rather than exponential: the usual reason for a
//! failed attempt is a host that has not finished starting.

mod clock;
mod handle;
mod settings;
mod shutdown;
mod status;

pub use clock::SessionClock;
pub use handle::{SessionHandle, start_session};
pub use settings::SessionSettings;
pub use shutdown::ShutdownSignal;

use crate::bridge::BridgeLink;
use crate::codec::{self, Frame};
use crate::error::session::SessionError;
use crate::error::transport::TransportError;
use crate::transport::{Transport, TransportEvent};

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use log::{debug, error, info, trace, warn};
use models::{AutocompleteBuffer, ConnectionState, ConsoleMessage};
use tokio::time::sleep as TokioSleep;

pub struct ConsoleSession<T: Transport> {
    transport: T,
    link: BridgeLink,
    settings: SessionSettings,
    clock: SessionClock,
    shutdown: ShutdownSignal,
    retry: Constant,
    state: ConnectionState,
}

impl<T: Transport> ConsoleSession<T> {
    /// Build a session in the `Connecting` state. Nothing happens until
    /// [`ConsoleSession::step`] or [`ConsoleSession::run`].
    pub fn new(
        transport: T,
        link: BridgeLink,
        settings: SessionSettings,
        clock: SessionClock,
        shutdown: ShutdownSignal,
    ) -> Self {
        let retry = Constant::new(settings.retry_delay);
        let session = Self {
            transport,
            link,
            settings,
            clock,
            shutdown,
            retry,
            state: ConnectionState::Connecting,
        };
        session.link.publish_state(session.state);
        session
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Run until shutdown is requested, then disconnect gracefully.
    ///
    /// # Errors
    ///
    /// - [`SessionError::FatalTransport`] if the transport cannot create a connection handle
    /// - [`SessionError::PresentationClosed`] if the presentation layer dropped its bridge
    pub async fn run(mut self) -> Result<(), SessionError> {
        info!("Console session started for {}", self.transport.address());

        if self.sleep_unless_shutdown(self.settings.startup_delay).await {
            return self.finish().await;
        }

        while !self.shutdown.is_requested() {
            match self.step().await {
                Ok(ConnectionState::Inactive) => break,
                Ok(_) => {}
                Err(e @ SessionError::FatalTransport { .. }) => {
                    error!("Console session stopped: {e}");
                    self.set_state(ConnectionState::Inactive);
                    return Err(e);
                }
                Err(e) => {
                    error!("Console session stopped: {e}");
                    self.finish().await?;
                    return Err(e);
                }
            }
        }

        self.finish().await
    }

    /// Perform one iteration of the current state and return the state that follows.
    ///
    /// # Errors
    ///
    /// See [`ConsoleSession::run`].
    pub async fn step(&mut self) -> Result<ConnectionState, SessionError> {
        match self.state {
            ConnectionState::Connecting => self.update_while_connecting().await?,
            ConnectionState::Connected => self.update_while_connected().await?,
            ConnectionState::Disconnecting => self.update_while_disconnecting().await,
            ConnectionState::Inactive => {}
        }
        Ok(self.state)
    }

    async fn update_while_connecting(&mut self) -> Result<(), SessionError> {
        let attempt = status::trying_connection(self.transport.address());
        self.emit_status(attempt).await?;

        let result = if self.transport.has_peer() {
            Ok(())
        } else {
            self.transport.connect(self.settings.connect_timeout).await
        };

        match result {
            Ok(()) => {
                self.retry.reset();
                self.emit_status(status::CONNECTED).await?;
                self.set_state(ConnectionState::Connected);
                return Ok(());
            }
            Err(e) if e.is_fatal() => {
                error!("Cannot create connection handle: {e}");
                let line = ConsoleMessage::status(status::fatal(&e.to_string()), self.now());
                self.link.try_on_message(line);
                self.set_state(ConnectionState::Inactive);
                return Err(SessionError::FatalTransport {
                    message: "Transport cannot create a connection handle".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                    source: e,
                });
            }
            Err(e) => warn!("Connection attempt failed: {e}"),
        }

        self.emit_status(status::CONNECTION_FAILED).await?;
        self.transport.reset();

        let delay = self
            .retry
            .next_backoff()
            .unwrap_or(self.settings.retry_delay);
        trace!("Next connection attempt in {delay:?}");
        self.sleep_unless_shutdown(delay).await;
        Ok(())
    }

    async fn update_while_connected(&mut self) -> Result<(), SessionError> {
        if let Err(e) = self.flush_pending_input().await {
            warn!("Lost host while sending: {e}");
            return self.on_session_lost().await;
        }

        let events = self.transport.poll_events(Duration::ZERO).await;
        if events.is_empty() {
            self.sleep_unless_shutdown(self.settings.idle_sleep).await;
            return Ok(());
        }

        let batch_size = self.settings.batch_size.max(1);
        let mut delivered = 0usize;

        for event in events {
            let bytes = match event {
                TransportEvent::Receive(bytes) => bytes,
                TransportEvent::Disconnect => {
                    info!("Transport reported disconnect");
                    return self.on_session_lost().await;
                }
            };

            match codec::decode_frame(&bytes) {
                Ok(Frame::Message {
                    severity,
                    timestamp,
                    text,
                }) => {
                    self.deliver(ConsoleMessage::new(text, timestamp, severity))
                        .await?;
                    delivered += 1;
                    if delivered % batch_size == 0 {
                        trace!("Delivered {delivered} messages, pausing");
                        TokioSleep(self.settings.batch_pause).await;
                    }
                }
                Ok(Frame::AutocompleteList { entries }) => {
                    debug!("Received {} autocomplete entries", entries.len());
                    self.link.on_autocomplete_result(entries);
                }
                Ok(Frame::Disconnect) => {
                    info!("Host sent disconnect notice");
                    return self.on_session_lost().await;
                }
                Ok(other) => {
                    let total = self.link.record_discarded_frame();
                    warn!(
                        "Discarding console-bound frame '{}' received from host ({total} discarded)",
                        char::from(other.tag())
                    );
                }
                Err(e) => {
                    let total = self.link.record_discarded_frame();
                    warn!("Discarding frame ({total} discarded): {e}");
                }
            }
        }

        Ok(())
    }

    async fn update_while_disconnecting(&mut self) {
        self.transport
            .disconnect_and_drain(
                self.settings.drain_rounds,
                self.settings.drain_round_timeout,
            )
            .await;
        self.set_state(ConnectionState::Connecting);
    }

    async fn flush_pending_input(&mut self) -> Result<(), TransportError> {
        if let Some(command) = self.link.take_pending_command() {
            match codec::encode_command(&command) {
                Ok(frame) => {
                    debug!("Sending command '{command}'");
                    self.transport.send(frame).await?;
                }
                Err(e) => warn!("Dropping command: {e}"),
            }
        }

        if let Some(query) = self.link.take_pending_autocomplete() {
            match codec::encode_autocomplete_request(&query) {
                Ok(frame) => {
                    trace!("Requesting autocomplete for '{query}'");
                    self.transport.send(frame).await?;
                }
                Err(e) => warn!("Dropping autocomplete query: {e}"),
            }
        }

        Ok(())
    }

    /// Host-initiated and transport-level disconnects end the epoch the same way.
    async fn on_session_lost(&mut self) -> Result<(), SessionError> {
        self.set_state(ConnectionState::Disconnecting);
        self.link.on_autocomplete_result(AutocompleteBuffer::empty());
        self.emit_status(status::DISCONNECTED).await
    }

    async fn finish(&mut self) -> Result<(), SessionError> {
        info!("Console session shutting down");
        let line = ConsoleMessage::status(status::SHUTTING_DOWN, self.now());
        self.link.try_on_message(line);

        self.transport
            .disconnect_and_drain(
                self.settings.drain_rounds,
                self.settings.drain_round_timeout,
            )
            .await;
        self.set_state(ConnectionState::Inactive);
        Ok(())
    }

    async fn emit_status(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let message = ConsoleMessage::status(text, self.now());
        self.deliver(message).await
    }

    /// Hand a message to the presentation layer, giving up only on shutdown.
    async fn deliver(&mut self, message: ConsoleMessage) -> Result<(), SessionError> {
        tokio::select! {
            biased;
            result = self.link.on_message(message) => {
                result.map_err(|e| SessionError::PresentationClosed {
                    message: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
            _ = self.shutdown.wait() => {
                debug!("Shutdown requested while the presentation layer was behind");
                Ok(())
            }
        }
    }

    /// Returns `true` if shutdown was requested before `duration` elapsed.
    async fn sleep_unless_shutdown(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = TokioSleep(duration) => false,
            _ = self.shutdown.wait() => true,
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            info!("Connection state: {} -> {}", self.state, state);
        }
        self.state = state;
        self.link.publish_state(state);
    }

    fn now(&self) -> f32 {
        self.clock.elapsed_seconds()
    }
}
