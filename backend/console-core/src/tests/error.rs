use crate::codec::decode_frame;
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::error::codec::CodecError;
use crate::transport::EnetTransport;

fn decode_then_connect(frame: &[u8], endpoint: &str) -> Result<EnetTransport, CoreError> {
    decode_frame(frame)?;
    let transport = EnetTransport::new(endpoint)?;
    Ok(transport)
}

/// **VALUE**: Verifies area errors convert into `CoreError` with `?`.
///
/// **WHY THIS MATTERS**: Callers that do not care which layer failed handle a
/// single error type.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[from]` on one of the variants.
#[test]
fn given_failures_in_each_area_when_propagated_then_wrap_in_core_error() {
    // Codec
    let codec = decode_then_connect(&[], "127.0.0.1:1").expect_err("empty frame");
    assert!(matches!(
        codec,
        CoreError::Codec(CodecError::TruncatedFrame { .. })
    ));

    // Transport
    let transport = decode_then_connect(b"X", "nowhere").expect_err("no port");
    assert!(matches!(transport, CoreError::Transport(ref e) if e.is_fatal()));

    // Config
    let mut config = ConsoleConfig::default();
    config.version = 9;
    let wrapped: CoreError = config.validate().expect_err("future version").into();
    assert!(wrapped.to_string().starts_with("Console Config Validation Error"));
}

/// **VALUE**: Verifies which codec errors count as protocol errors.
///
/// **WHY THIS MATTERS**: Protocol errors are dropped and counted by the loop;
/// encode errors point at a caller bug instead.
///
/// **BUG THIS CATCHES**: Would catch an encode error being counted as a bad
/// frame from the host.
#[test]
fn given_codec_errors_when_classified_then_only_decode_failures_are_protocol_errors() {
    let invalid_severity = decode_frame(&[b'M', 9, 0, 0, 0, 0, 0, 0]).expect_err("severity 9");
    let too_long = crate::codec::encode_command(&"c".repeat(300)).expect_err("too long");

    assert!(matches!(invalid_severity, CodecError::InvalidSeverity { .. }));
    assert!(invalid_severity.is_protocol_error());
    assert!(!too_long.is_protocol_error());
}
