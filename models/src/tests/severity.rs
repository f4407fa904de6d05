use crate::{ModelError, Severity};

/// **VALUE**: Verifies every wire byte 0-5 maps to the matching level and back.
///
/// **WHY THIS MATTERS**: The host encodes severity as a single byte. If the ordinals
/// drift, warnings show up as errors (or worse, fatal lines disappear as info).
///
/// **BUG THIS CATCHES**: Would catch if someone reorders the enum variants or changes
/// a discriminant.
#[test]
fn given_wire_bytes_0_to_5_when_converted_then_match_ordinals() {
    // GIVEN: The expected ordering
    let expected = [
        Severity::Info,
        Severity::Developer,
        Severity::Verbose,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    for (byte, level) in expected.iter().enumerate() {
        // WHEN: Converting the byte
        let parsed = Severity::try_from(byte as u8).expect("byte in range");

        // THEN: Level and byte agree in both directions
        assert_eq!(parsed, *level);
        assert_eq!(level.as_byte(), byte as u8);
    }
    assert!(Severity::Info < Severity::Fatal, "Levels should ascend");
}

/// **VALUE**: Verifies bytes outside 0-5 are rejected instead of wrapped.
///
/// **WHY THIS MATTERS**: A corrupted frame must not invent a severity level.
///
/// **BUG THIS CATCHES**: Would catch an unchecked cast or a modulo fallback.
#[test]
fn given_out_of_range_byte_when_converted_then_returns_validation_error() {
    // GIVEN/WHEN: Converting the first invalid byte and the maximum byte
    for byte in [6u8, u8::MAX] {
        let result = Severity::try_from(byte);

        // THEN: Validation error naming the byte
        match result {
            Err(ModelError::Validation { message, .. }) => {
                assert!(message.contains(&byte.to_string()), "got: {message}");
            }
            Ok(level) => panic!("Byte {byte} should not map to {level}"),
        }
    }
}

/// **VALUE**: Verifies `try_into` resolves to the model error type, not the
/// `Error` severity level.
///
/// **WHY THIS MATTERS**: `Severity` has a variant called `Error`, so the
/// conversion's error type must be spelled out for the crate to build at all.
///
/// **BUG THIS CATCHES**: Would catch a signature that names the error type
/// ambiguously next to the `Severity::Error` variant.
#[test]
fn given_error_level_byte_when_converted_with_try_into_then_yields_error_variant() {
    // GIVEN: The wire byte for the Error level
    let byte = Severity::Error.as_byte();

    // WHEN: Converting through the generic conversion trait
    let result: Result<Severity, ModelError> = byte.try_into();
    let rejected: Result<Severity, <Severity as TryFrom<u8>>::Error> = 9u8.try_into();

    // THEN: The level comes back and the rejection is a ModelError
    assert!(matches!(result, Ok(Severity::Error)));
    assert!(matches!(rejected, Err(ModelError::Validation { .. })));
}
