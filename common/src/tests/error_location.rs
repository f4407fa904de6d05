use crate::ErrorLocation;

use std::panic::Location;

#[track_caller]
fn capture_location() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

/// **VALUE**: Verifies that `ErrorLocation` points at the call site, not the helper.
///
/// **WHY THIS MATTERS**: Every error in the workspace carries an `ErrorLocation`.
/// If `#[track_caller]` stops propagating, all errors report the constructor's
/// line and lose their debugging value.
///
/// **BUG THIS CATCHES**: Would catch if `#[track_caller]` is dropped from a helper
/// and every capture collapses onto one line.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    // GIVEN/WHEN: Capturing location from two consecutive call sites
    let first = capture_location();
    let second = capture_location();

    // THEN: Same file, consecutive lines
    assert_eq!(first.file, second.file, "Should have same file");
    assert!(
        first.file.ends_with("error_location.rs"),
        "Should point at this test file, got {}",
        first.file
    );
    assert_eq!(first.line + 1, second.line, "Lines should be sequential");
    assert!(first.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the `[file:line:column]` Display format.
///
/// **WHY THIS MATTERS**: Error messages embed this text verbatim; operators read it
/// in the log file to find where a connection failure was raised.
///
/// **BUG THIS CATCHES**: Would catch if the brackets or separators change.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: A hand-built location
    let location = ErrorLocation {
        file: "src/session/mod.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting as string
    let formatted = location.to_string();

    // THEN: Should produce "[file:line:column]"
    assert_eq!(formatted, "[src/session/mod.rs:42:7]");
}
