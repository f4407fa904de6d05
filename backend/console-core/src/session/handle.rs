//! Handle to a connection loop running on its own task.

use super::{ConsoleSession, SessionClock, SessionSettings, ShutdownSignal};
use crate::bridge::BridgeLink;
use crate::error::session::SessionError;
use crate::transport::Transport;

use common::ErrorLocation;

use std::panic::Location;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle to a running [`ConsoleSession`].
///
/// Returned by [`start_session`]. Dropping the handle drops the shutdown
/// sender, which the session treats as a shutdown request.
///
/// # Examples
///
/// ```no_run
/// use console_core::bridge;
/// use console_core::session::{SessionClock, SessionSettings, start_session};
/// use console_core::transport::EnetTransport;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let transport = EnetTransport::new("127.0.0.1:23005")?;
///     let (_console, link) = bridge::channel(bridge::DEFAULT_MESSAGE_CAPACITY);
///     let handle = start_session(transport, link, SessionSettings::default(), SessionClock::init());
///     handle.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct SessionHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), SessionError>>,
}

impl SessionHandle {
    /// Ask the loop to stop without waiting for it.
    pub fn signal_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request shutdown and wait for the final disconnect to complete.
    ///
    /// # Errors
    ///
    /// Returns whatever ended the session, or [`SessionError::Join`] if the
    /// task panicked or was cancelled.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        self.signal_shutdown();
        debug!("Waiting for console session to finish");

        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(SessionError::Join {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// Spawn the connection loop for `transport` on the current runtime.
///
/// The presentation side keeps the [`ConsoleBridge`](crate::bridge::ConsoleBridge)
/// that was created together with `link`.
pub fn start_session<T>(
    transport: T,
    link: BridgeLink,
    settings: SessionSettings,
    clock: SessionClock,
) -> SessionHandle
where
    T: Transport + 'static,
{
    let (shutdown, signal) = ShutdownSignal::pair();
    let session = ConsoleSession::new(transport, link, settings, clock, signal);
    let task = tokio::spawn(session.run());

    SessionHandle { shutdown, task }
}
