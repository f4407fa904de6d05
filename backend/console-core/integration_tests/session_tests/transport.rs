use crate::session_tests::helpers::{TEST_TIMEOUT, TestHost};

use console_core::codec;
use console_core::transport::{EnetTransport, Transport, TransportEvent};

use std::time::{Duration, Instant};

/// Connect, then keep servicing until the host has seen the handshake finish.
async fn connect_to(host: &mut TestHost, transport: &mut EnetTransport) {
    transport
        .connect(TEST_TIMEOUT)
        .await
        .expect("connects to test host");

    let accepted = host.accept_console();
    tokio::pin!(accepted);
    loop {
        tokio::select! {
            () = &mut accepted => return,
            events = transport.poll_events(Duration::from_millis(5)) => {
                assert!(events.is_empty(), "unexpected events {events:?}");
            }
        }
    }
}

/// **VALUE**: Verifies sending and disconnecting stay bounded when the host
/// stops reading.
///
/// **WHY THIS MATTERS**: A host paused in a debugger keeps its socket open but
/// never answers; the console loop and its shutdown must not hang on it.
///
/// **BUG THIS CATCHES**: Would catch a send that waits for the host to take
/// the data, or a disconnect that waits for an acknowledgement forever.
#[tokio::test]
async fn given_frozen_host_when_sending_and_disconnecting_then_returns_in_bounded_time() {
    // GIVEN: A connected transport and a host that then stops servicing
    let mut host = TestHost::bind();
    let mut transport = EnetTransport::new(&host.endpoint).expect("valid endpoint");
    connect_to(&mut host, &mut transport).await;
    host.freeze();

    // WHEN: Queueing many frames and then disconnecting
    let started = Instant::now();
    let frame = codec::encode_command(&"x".repeat(200)).expect("encodable");
    for _ in 0..2_000 {
        tokio::time::timeout(Duration::from_millis(100), transport.send(frame.clone()))
            .await
            .expect("send does not wait on the host")
            .expect("frame queued");
    }
    let _ = transport.poll_events(Duration::ZERO).await;
    transport
        .disconnect_and_drain(5, Duration::from_millis(10))
        .await;

    // THEN: Everything finished well inside the test timeout, peer released
    assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
    assert!(!transport.has_peer());
}

/// **VALUE**: Verifies frames from the host arrive as separate events in order.
///
/// **WHY THIS MATTERS**: The loop decodes each event as one frame; merged or
/// reordered packets would corrupt the log.
///
/// **BUG THIS CATCHES**: Would catch packets coalesced into one buffer or
/// delivered out of order.
#[tokio::test]
async fn given_host_frames_when_polled_then_one_event_per_frame_in_order() {
    // GIVEN
    let mut host = TestHost::bind();
    let mut transport = EnetTransport::new(&host.endpoint).expect("valid endpoint");
    connect_to(&mut host, &mut transport).await;

    // WHEN: The host sends three frames
    let frames: Vec<Vec<u8>> = (0u8..3).map(|i| vec![b'Q', i, i, i]).collect();
    for frame in &frames {
        host.send_frame(frame.clone());
    }

    let mut received = Vec::new();
    let deadline = Instant::now() + TEST_TIMEOUT;
    while received.len() < frames.len() && Instant::now() < deadline {
        for event in transport.poll_events(Duration::from_millis(50)).await {
            match event {
                TransportEvent::Receive(bytes) => received.push(bytes),
                TransportEvent::Disconnect => panic!("unexpected disconnect"),
            }
        }
    }

    // THEN
    assert_eq!(received, frames);

    transport
        .disconnect_and_drain(5, Duration::from_millis(10))
        .await;
    host.wait_for_disconnect().await;
}
