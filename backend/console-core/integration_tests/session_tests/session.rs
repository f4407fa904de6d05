use crate::session_tests::helpers::{TestHost, fast_settings, silent_endpoint, wait_for_line};

use console_core::bridge;
use console_core::codec::{self, Frame};
use console_core::session::{SessionClock, start_session};
use console_core::transport::EnetTransport;

use std::cell::Cell;
use std::time::Duration;

use models::{AutocompleteBuffer, AutocompleteEntry, ConnectionState, Severity};

/// **VALUE**: Verifies a host log line travels end to end and a command goes back.
///
/// **WHY THIS MATTERS**: This is the whole console round trip over a real socket:
/// connect, receive a log line, send a command, shut down.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The transport never completes the ENet handshake
/// - Frames lose bytes or arrive out of order
/// - Commands are never flushed while connected
/// - Shutdown hangs on an open connection
#[tokio::test]
async fn given_running_host_when_console_connects_then_exchanges_frames() {
    // GIVEN: A host listening and a console session pointed at it
    let mut host = TestHost::bind();
    let (mut console, link) = bridge::channel(64);
    let transport = EnetTransport::new(&host.endpoint).expect("valid endpoint");
    let handle = start_session(transport, link, fast_settings(), SessionClock::init());

    host.accept_console().await;
    wait_for_line(&mut console, |l| l.contains("Successfully connected")).await;
    assert_eq!(console.connection_state(), ConnectionState::Connected);

    // WHEN: The host logs a warning
    let mut frame = vec![b'M', 3];
    frame.extend_from_slice(&12.5f32.to_le_bytes());
    frame.extend_from_slice(&[5, 0]);
    frame.extend_from_slice(b"Hello");
    host.send_frame(frame);

    // THEN: The console receives it unchanged
    let message = tokio::time::timeout(Duration::from_secs(5), console.next_message())
        .await
        .expect("message in time")
        .expect("bridge open");
    assert_eq!(message.text(), "Hello");
    assert_eq!(message.time_submitted(), 12.5);
    assert_eq!(message.severity(), Severity::Warning);

    // WHEN: The operator submits a command
    console.submit_command("map dm1").expect("short command");

    // THEN: The host receives exactly that command frame
    let received = host.receive_frame().await;
    assert_eq!(received, codec::encode_command("map dm1").expect("encodable"));

    // WHEN: The console shuts down
    handle.shutdown().await.expect("clean shutdown");
    host.wait_for_disconnect().await;

    // THEN: Inactive, with the closing line delivered
    assert_eq!(console.connection_state(), ConnectionState::Inactive);
    let lines: Vec<String> = console
        .drain_messages()
        .into_iter()
        .map(|m| m.into_text())
        .collect();
    assert!(lines.iter().any(|l| l.ends_with("Closing connection")));
}

/// **VALUE**: Verifies the console reconnects after the host says goodbye.
///
/// **WHY THIS MATTERS**: Hosts restart constantly during development; the
/// console must follow them without operator action.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - 'X' is ignored and the console keeps a dead connection
/// - The loop stays in Disconnecting
/// - Autocomplete suggestions survive into the next session
#[tokio::test]
async fn given_connected_console_when_host_sends_disconnect_then_reconnects() {
    // GIVEN: A connected console with suggestions from the host
    let mut host = TestHost::bind();
    let (mut console, link) = bridge::channel(64);
    let transport = EnetTransport::new(&host.endpoint).expect("valid endpoint");
    let handle = start_session(transport, link, fast_settings(), SessionClock::init());

    host.accept_console().await;
    wait_for_line(&mut console, |l| l.contains("Successfully connected")).await;

    let list = Frame::AutocompleteList {
        entries: AutocompleteBuffer::new(vec![AutocompleteEntry::command("map")]),
    }
    .encode()
    .expect("encodable list");
    host.send_frame(list);

    // WHEN: The host sends its disconnect notice
    host.send_frame(vec![codec::TAG_DISCONNECT]);
    host.wait_for_disconnect().await;

    // THEN: The console reports it and comes back on its own
    wait_for_line(&mut console, |l| l.ends_with("Disconnected!")).await;
    assert!(console.autocomplete_snapshot().is_empty());

    host.accept_console().await;
    wait_for_line(&mut console, |l| l.contains("Successfully connected")).await;
    assert_eq!(console.connection_state(), ConnectionState::Connected);

    handle.shutdown().await.expect("clean shutdown");
}

/// **VALUE**: Verifies an autocomplete query reaches the host and its answer comes back.
///
/// **WHY THIS MATTERS**: Suggestions are the console's second feature after logs.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The query slot is never flushed
/// - The list frame is decoded but never published to the presentation side
#[tokio::test]
async fn given_autocomplete_query_when_host_answers_then_snapshot_updates() {
    // GIVEN: A connected console
    let mut host = TestHost::bind();
    let (mut console, link) = bridge::channel(64);
    let transport = EnetTransport::new(&host.endpoint).expect("valid endpoint");
    let handle = start_session(transport, link, fast_settings(), SessionClock::init());

    host.accept_console().await;
    wait_for_line(&mut console, |l| l.contains("Successfully connected")).await;

    // WHEN: The operator types a prefix and the host answers
    console.request_autocomplete_update("sv_").expect("short query");
    let query = host.receive_frame().await;
    assert_eq!(query, b"A\x03sv_".to_vec());

    let expected = AutocompleteBuffer::new(vec![
        AutocompleteEntry::variable("sv_gravity", "800").with_read_only(true),
        AutocompleteEntry::variable("sv_cheats", "0"),
    ]);
    let list = Frame::AutocompleteList {
        entries: expected.clone(),
    }
    .encode()
    .expect("encodable list");
    host.send_frame(list);

    // THEN: The snapshot matches what the host sent
    let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = console.autocomplete_snapshot();
            if !snapshot.is_empty() {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("autocomplete result in time");
    assert_eq!(*snapshot, expected);

    handle.shutdown().await.expect("clean shutdown");
}

/// **VALUE**: Verifies the console keeps retrying while no host is listening.
///
/// **WHY THIS MATTERS**: Operators start the console first and the host later.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - An unanswered connection is treated as fatal
/// - Retry status lines stop after the first failure
/// - Shutdown waits for a retry delay to expire
#[tokio::test]
async fn given_no_host_when_console_runs_then_keeps_retrying_until_shutdown() {
    // GIVEN: An endpoint nobody answers on
    let (_silent, endpoint) = silent_endpoint();
    let (mut console, link) = bridge::channel(256);
    let transport = EnetTransport::new(&endpoint).expect("valid endpoint");
    let handle = start_session(transport, link, fast_settings(), SessionClock::init());

    // WHEN: Two failed attempts have been reported
    let failures = Cell::new(0);
    let lines = wait_for_line(&mut console, |l| {
        if l.ends_with("Connection failed") {
            failures.set(failures.get() + 1);
        }
        failures.get() >= 2
    })
    .await;

    // THEN: Still searching, never fatal
    assert_eq!(console.connection_state(), ConnectionState::Connecting);
    assert!(lines.iter().any(|l| l.contains("Trying connection...")));
    assert!(!handle.is_finished());

    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("shutdown in time")
        .expect("clean shutdown");
    assert_eq!(console.connection_state(), ConnectionState::Inactive);
}
