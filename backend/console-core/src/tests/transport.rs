use crate::error::transport::TransportError;
use crate::transport::{EnetTransport, Transport};

use std::time::Duration;

/// **VALUE**: Verifies a well-formed endpoint yields a transport with no peer yet.
///
/// **WHY THIS MATTERS**: Creating the transport binds a local socket but must not
/// talk to the host; the loop decides when to connect.
///
/// **BUG THIS CATCHES**: Would catch an eager connect in the constructor.
#[test]
fn given_loopback_endpoint_when_created_then_has_address_and_no_peer() {
    let transport = EnetTransport::new("127.0.0.1:23005").expect("valid endpoint");

    assert_eq!(transport.address(), "127.0.0.1:23005");
    assert_eq!(transport.remote().port(), 23005);
    assert!(!transport.has_peer());
}

/// **VALUE**: Verifies IPv6 endpoints bind an IPv6 local host.
///
/// **WHY THIS MATTERS**: The host address is configurable and may be `::1`.
///
/// **BUG THIS CATCHES**: Would catch binding an IPv4 socket for an IPv6 host,
/// which can never reach it.
#[test]
fn given_ipv6_endpoint_when_created_then_keeps_bracketed_address() {
    let Ok(transport) = EnetTransport::new("[::1]:23005") else {
        // No IPv6 loopback in this environment.
        return;
    };

    assert_eq!(transport.address(), "[::1]:23005");
    assert!(transport.remote().is_ipv6());
}

/// **VALUE**: Verifies unusable endpoints fail with the fatal HostCreate error.
///
/// **WHY THIS MATTERS**: The binary exits non-zero on this instead of retrying
/// forever against an address that can never work.
///
/// **BUG THIS CATCHES**: Would catch bad endpoints surfacing later as ordinary
/// connection failures.
#[test]
fn given_invalid_endpoints_when_created_then_host_create_is_fatal() {
    for endpoint in ["not an address", "127.0.0.1", "127.0.0.1:port", ""] {
        let error = EnetTransport::new(endpoint).expect_err("invalid endpoint");
        assert!(
            matches!(error, TransportError::HostCreate { .. }),
            "{endpoint}: {error}"
        );
        assert!(error.is_fatal());
    }
}

/// **VALUE**: Verifies the transport can be printed for diagnostics.
///
/// **WHY THIS MATTERS**: Results holding a transport are inspected in tests and logs.
///
/// **BUG THIS CATCHES**: Would catch a missing `Debug` implementation.
#[test]
fn given_transport_when_debug_formatted_then_shows_remote_and_peer() {
    let transport = EnetTransport::new("127.0.0.1:23005").expect("valid endpoint");

    let text = format!("{transport:?}");

    assert!(text.starts_with("EnetTransport"), "got: {text}");
    assert!(text.contains("127.0.0.1:23005"), "got: {text}");
    assert!(text.contains("has_peer: false"), "got: {text}");
}

/// **VALUE**: Verifies sending without a peer is an error, not a panic.
///
/// **WHY THIS MATTERS**: A command can race a disconnect.
///
/// **BUG THIS CATCHES**: Would catch an unwrap on the peer handle.
#[tokio::test]
async fn given_no_peer_when_sending_then_returns_not_connected() {
    let mut transport = EnetTransport::new("127.0.0.1:23005").expect("valid endpoint");

    let result = transport.send(vec![b'X']).await;

    assert!(matches!(result, Err(TransportError::NotConnected { .. })));
    assert!(!result.expect_err("not connected").is_fatal());
}

/// **VALUE**: Verifies polling and draining without a peer return immediately.
///
/// **WHY THIS MATTERS**: Shutdown drains even when the loop never connected.
///
/// **BUG THIS CATCHES**: Would catch a drain that sleeps all its rounds for nothing.
#[tokio::test]
async fn given_no_peer_when_polling_and_draining_then_returns_immediately() {
    let mut transport = EnetTransport::new("127.0.0.1:23005").expect("valid endpoint");

    let events = transport.poll_events(Duration::from_secs(5)).await;
    tokio::time::timeout(
        Duration::from_millis(100),
        transport.disconnect_and_drain(10, Duration::from_secs(1)),
    )
    .await
    .expect("drain without peer returns at once");

    assert!(events.is_empty());
}

/// **VALUE**: Verifies a connect attempt nobody answers ends within its timeout.
///
/// **WHY THIS MATTERS**: Datagrams to a missing host vanish silently; only the
/// timeout tells the loop to retry.
///
/// **BUG THIS CATCHES**: Would catch a connect that waits for an answer forever,
/// or one that keeps the peer slot so the retry cannot start.
#[tokio::test]
async fn given_silent_endpoint_when_connecting_then_times_out_and_reset_frees_slot() {
    // GIVEN: A UDP port that never answers
    let silent = std::net::UdpSocket::bind("127.0.0.1:0").expect("bind silent socket");
    let endpoint = silent.local_addr().expect("bound address").to_string();
    let mut transport = EnetTransport::new(&endpoint).expect("valid endpoint");

    // WHEN: Connecting twice, resetting in between like the loop does
    let first = tokio::time::timeout(
        Duration::from_secs(2),
        transport.connect(Duration::from_millis(50)),
    )
    .await
    .expect("connect bounded by its timeout");
    transport.reset();
    let second = transport.connect(Duration::from_millis(50)).await;

    // THEN: Both attempts time out; neither is fatal or out of peer slots
    assert!(matches!(first, Err(TransportError::ConnectTimeout { .. })), "{first:?}");
    assert!(matches!(second, Err(TransportError::ConnectTimeout { .. })), "{second:?}");
    transport.reset();
    assert!(!transport.has_peer());
}
