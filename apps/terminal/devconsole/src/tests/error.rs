// Unit tests for error module

use crate::error::DevConsoleError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies errors render their kind, message and capture location.
///
/// **WHY THIS MATTERS**: The binary prints this text on a fatal exit; it is
/// all the operator gets.
///
/// **BUG THIS CATCHES**: Would catch a display format that drops the location.
#[test]
fn given_startup_error_when_displayed_then_includes_message_and_location() {
    // GIVEN
    let err = DevConsoleError::Startup {
        message: String::from("Invalid host endpoint"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN
    let text = err.to_string();

    // THEN
    assert!(text.starts_with("Startup Error: Invalid host endpoint"));
    assert!(text.contains("tests/error.rs:"), "{text}");
}
