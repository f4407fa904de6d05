//! Test helpers for session integration tests.
//!
//! A minimal developer-console host over a real ENet connection:
//! - Binding on an ephemeral localhost UDP port
//! - Servicing the host on a background task
//! - Sending/receiving raw protocol frames
//! - Waiting for console lines on the presentation side

use console_core::bridge::ConsoleBridge;
use console_core::session::SessionSettings;

use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rusty_enet::{Event, Host, HostSettings, Packet, PeerID};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Generous upper bound for anything the tests wait on.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const HOST_PEER_LIMIT: usize = 4;
const HOST_CHANNEL_LIMIT: usize = 2;
const HOST_SERVICE_INTERVAL: Duration = Duration::from_millis(1);

/// What the test host saw from the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Connected,
    Frame(Vec<u8>),
    Disconnected,
}

/// Test helper: A developer-console host serviced on a background task.
///
/// Dropping it stops the task and closes the socket.
pub struct TestHost {
    pub endpoint: String,
    outgoing: UnboundedSender<Vec<u8>>,
    events: UnboundedReceiver<HostEvent>,
    paused: Arc<AtomicBool>,
}

impl TestHost {
    /// Test helper: Bind a host on an ephemeral localhost port and start servicing it.
    pub fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind test host");
        let endpoint = socket.local_addr().expect("Bound address").to_string();
        let host = Host::new(
            socket,
            HostSettings {
                peer_limit: HOST_PEER_LIMIT,
                channel_limit: HOST_CHANNEL_LIMIT,
                ..Default::default()
            },
        )
        .expect("Failed to create test host");

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let paused = Arc::new(AtomicBool::new(false));
        tokio::spawn(serve(host, outgoing_rx, events_tx, Arc::clone(&paused)));

        Self {
            endpoint,
            outgoing,
            events,
            paused,
        }
    }

    /// Test helper: Wait for the next console connection.
    pub async fn accept_console(&mut self) {
        loop {
            if self.next_event().await == HostEvent::Connected {
                return;
            }
        }
    }

    /// Test helper: Send one raw frame to the most recently connected console.
    pub fn send_frame(&self, frame: Vec<u8>) {
        self.outgoing
            .send(frame)
            .expect("Test host task stopped");
    }

    /// Test helper: Receive the next frame from the console.
    pub async fn receive_frame(&mut self) -> Vec<u8> {
        loop {
            if let HostEvent::Frame(frame) = self.next_event().await {
                return frame;
            }
        }
    }

    /// Test helper: Wait until the console's connection is gone.
    pub async fn wait_for_disconnect(&mut self) {
        loop {
            if self.next_event().await == HostEvent::Disconnected {
                return;
            }
        }
    }

    /// Test helper: Stop servicing the host without closing its socket, like a
    /// host stopped in a debugger.
    pub fn freeze(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    async fn next_event(&mut self) -> HostEvent {
        tokio::time::timeout(TEST_TIMEOUT, self.events.recv())
            .await
            .expect("No host event in time")
            .expect("Test host task stopped")
    }
}

async fn serve(
    mut host: Host<UdpSocket>,
    mut outgoing: UnboundedReceiver<Vec<u8>>,
    events: UnboundedSender<HostEvent>,
    paused: Arc<AtomicBool>,
) {
    let mut console: Option<PeerID> = None;

    while !events.is_closed() {
        if paused.load(Ordering::SeqCst) {
            tokio::time::sleep(HOST_SERVICE_INTERVAL).await;
            continue;
        }

        while let Ok(frame) = outgoing.try_recv() {
            if let Some(peer) = console {
                let packet = Packet::reliable(frame.as_slice());
                host.peer_mut(peer)
                    .send(0, &packet)
                    .expect("Failed to queue frame for console");
            }
        }

        loop {
            let event = match host.service().expect("Test host service failed") {
                Some(Event::Connect { peer, .. }) => {
                    console = Some(peer.id());
                    HostEvent::Connected
                }
                Some(Event::Disconnect { .. }) => HostEvent::Disconnected,
                Some(Event::Receive { packet, .. }) => HostEvent::Frame(packet.data().to_vec()),
                None => break,
            };
            let _ = events.send(event);
        }

        tokio::time::sleep(HOST_SERVICE_INTERVAL).await;
    }
}

/// Test helper: Endpoint on which nothing ever answers.
///
/// The socket stays bound so the port cannot be reused while the test runs.
pub fn silent_endpoint() -> (UdpSocket, String) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind silent socket");
    let endpoint = socket.local_addr().expect("Bound address").to_string();
    (socket, endpoint)
}

/// Test helper: Collect console lines until one satisfies `predicate`.
///
/// Returns every line seen, the matching one last.
pub async fn wait_for_line(
    console: &mut ConsoleBridge,
    predicate: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut seen = Vec::new();
    let finished = tokio::time::timeout(TEST_TIMEOUT, async {
        while let Some(message) = console.next_message().await {
            let text = message.into_text();
            let done = predicate(&text);
            seen.push(text);
            if done {
                return;
            }
        }
    })
    .await;
    assert!(
        finished.is_ok(),
        "Expected console line never arrived, saw {seen:?}"
    );
    seen
}

/// Timings short enough for tests but long enough for a real localhost socket.
pub fn fast_settings() -> SessionSettings {
    SessionSettings {
        connect_timeout: Duration::from_millis(300),
        retry_delay: Duration::from_millis(20),
        startup_delay: Duration::ZERO,
        drain_rounds: 5,
        drain_round_timeout: Duration::from_millis(10),
        idle_sleep: Duration::from_millis(1),
        batch_size: 15,
        batch_pause: Duration::from_millis(1),
    }
}
