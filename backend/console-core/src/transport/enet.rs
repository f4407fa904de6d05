use crate::error::transport::TransportError;
use crate::transport::{Transport, TransportEvent};

use common::ErrorLocation;

use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::panic::Location;
use std::time::Duration;

use log::{debug, info, trace, warn};
use rusty_enet::{Event, Host, HostSettings, Packet, PeerID};
use tokio::time::{Instant, sleep as TokioSleep};

/// The console only ever talks to one host.
const PEER_LIMIT: usize = 1;
const CHANNEL_LIMIT: usize = 2;
/// Channels requested from the host; every frame travels on the first.
const CONNECT_CHANNELS: usize = 1;
const FRAME_CHANNEL: u8 = 0;
const CONNECT_DATA: u32 = 0;
const DISCONNECT_DATA: u32 = 0;

/// How long to wait between services of the local host while nothing is ready.
const SERVICE_INTERVAL: Duration = Duration::from_millis(2);

/// What one service of the local host produced, detached from the host borrow.
enum Serviced {
    Connect,
    Disconnect,
    Receive(Vec<u8>),
}

/// [`Transport`] over ENet: reliable, ordered packets on top of UDP datagrams.
///
/// Owns a local ENet host with room for a single peer. Every wait is spent
/// servicing that host in short intervals, so no call outlives its timeout.
pub struct EnetTransport {
    host: Host<UdpSocket>,
    remote: SocketAddr,
    address: String,
    peer: Option<PeerID>,
}

impl EnetTransport {
    /// Bind a local ENet host for talking to `endpoint` (e.g. `127.0.0.1:23005`
    /// or `[::1]:23005`).
    ///
    /// Nothing is sent until [`Transport::connect`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::HostCreate`] if the endpoint does not resolve,
    /// the local UDP socket cannot be bound, or the ENet host cannot be created.
    /// This is a startup failure, not a retryable one.
    #[track_caller]
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        let remote = endpoint
            .to_socket_addrs()
            .map_err(|e| TransportError::HostCreate {
                message: format!("Invalid host endpoint '{endpoint}': {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?
            .next()
            .ok_or_else(|| TransportError::HostCreate {
                message: format!("Host endpoint '{endpoint}' resolved to no address"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let local = match remote {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };

        let socket = UdpSocket::bind(local).map_err(|e| TransportError::HostCreate {
            message: format!("Failed to bind local socket {local}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let host = Host::new(
            socket,
            HostSettings {
                peer_limit: PEER_LIMIT,
                channel_limit: CHANNEL_LIMIT,
                ..Default::default()
            },
        )
        .map_err(|e| TransportError::HostCreate {
            message: format!("Failed to create local host: {e:?}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!("Local host bound for {remote}");

        Ok(Self {
            host,
            remote,
            address: remote.to_string(),
            peer: None,
        })
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    fn service(&mut self) -> Result<Option<Serviced>, TransportError> {
        let event = self.host.service().map_err(|e| TransportError::Service {
            message: format!("Servicing connection to {} failed: {e:?}", self.address),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(event.map(|event| match event {
            Event::Connect { .. } => Serviced::Connect,
            Event::Disconnect { .. } => Serviced::Disconnect,
            Event::Receive { packet, .. } => Serviced::Receive(packet.data().to_vec()),
        }))
    }

    /// Service the host until it produces an event or `timeout` runs out.
    async fn next_event(&mut self, timeout: Duration) -> Result<Option<Serviced>, TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = self.service()? {
                return Ok(Some(event));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            TokioSleep(SERVICE_INTERVAL.min(deadline - now)).await;
        }
    }
}

impl Debug for EnetTransport {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter
            .debug_struct("EnetTransport")
            .field("remote", &self.remote)
            .field("has_peer", &self.peer.is_some())
            .finish_non_exhaustive()
    }
}

impl Transport for EnetTransport {
    fn address(&self) -> &str {
        &self.address
    }

    fn has_peer(&self) -> bool {
        self.peer.is_some()
    }

    async fn connect(&mut self, timeout: Duration) -> Result<(), TransportError> {
        if self.peer.is_some() {
            return Ok(());
        }

        debug!("Connecting to {} (timeout {timeout:?})", self.address);

        let peer = self
            .host
            .connect(self.remote, CONNECT_CHANNELS, CONNECT_DATA)
            .map_err(|e| TransportError::Connect {
                message: format!("No free peer slot for {}: {e:?}", self.address),
                location: ErrorLocation::from(Location::caller()),
            })?
            .id();
        self.peer = Some(peer);

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.next_event(remaining).await? {
                Some(Serviced::Connect) => {
                    info!("Connected to host at {}", self.address);
                    return Ok(());
                }
                Some(Serviced::Disconnect) => {
                    return Err(TransportError::Connect {
                        message: format!("Host at {} rejected the connection", self.address),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                Some(Serviced::Receive(bytes)) => {
                    trace!("Ignoring {} bytes received before the handshake", bytes.len());
                }
                None => {
                    return Err(TransportError::ConnectTimeout {
                        message: format!("No answer from {} within {timeout:?}", self.address),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }
    }

    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        let peer = self.peer.ok_or_else(|| TransportError::NotConnected {
            message: "Cannot send without a connected host".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        trace!("Queueing {} byte frame", frame.len());

        // Queues only; the datagrams go out on the next service.
        let packet = Packet::reliable(frame.as_slice());
        self.host
            .peer_mut(peer)
            .send(FRAME_CHANNEL, &packet)
            .map_err(|e| TransportError::Send {
                message: format!("Failed to queue frame for {}: {e:?}", self.address),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn poll_events(&mut self, timeout: Duration) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        if self.peer.is_none() {
            return events;
        }

        // Only the first event may be waited for; after that take what is ready.
        let mut wait = timeout;
        loop {
            match self.next_event(wait).await {
                Ok(None) => break,
                Ok(Some(Serviced::Receive(bytes))) => {
                    events.push(TransportEvent::Receive(bytes));
                }
                Ok(Some(Serviced::Disconnect)) => {
                    debug!("Host at {} dropped the connection", self.address);
                    self.peer = None;
                    events.push(TransportEvent::Disconnect);
                    break;
                }
                Ok(Some(Serviced::Connect)) => {
                    trace!("Ignoring repeated connect from {}", self.address);
                }
                Err(e) => {
                    warn!("Connection to {} lost: {e}", self.address);
                    events.push(TransportEvent::Disconnect);
                    break;
                }
            }
            wait = Duration::ZERO;
        }

        events
    }

    fn reset(&mut self) {
        if let Some(peer) = self.peer.take() {
            self.host.peer_mut(peer).reset();
            debug!("Discarded peer handle for {}", self.address);
        }
    }

    async fn disconnect_and_drain(&mut self, rounds: u32, per_round: Duration) {
        let Some(peer) = self.peer else {
            return;
        };

        self.host.peer_mut(peer).disconnect(DISCONNECT_DATA);

        let mut acknowledged = false;
        for round in 0..rounds {
            match self.next_event(per_round).await {
                Ok(Some(Serviced::Disconnect)) => {
                    trace!("Connection to {} settled after {round} rounds", self.address);
                    acknowledged = true;
                    break;
                }
                Ok(Some(Serviced::Receive(bytes))) => {
                    trace!("Dropped {} byte frame while draining", bytes.len());
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Drain of {} stopped early: {e}", self.address);
                    break;
                }
            }
        }

        if acknowledged {
            self.peer = None;
        } else {
            // Frees the only peer slot for the next connection attempt.
            self.reset();
        }

        info!("Disconnected from {}", self.address);
    }
}
