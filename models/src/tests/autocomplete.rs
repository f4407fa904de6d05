use crate::{AutocompleteBuffer, AutocompleteEntry, ModelError};

/// **VALUE**: Verifies a read-only variable suggestion parses into its parts.
///
/// **WHY THIS MATTERS**: The autocomplete window shows name, value and a
/// read-only marker; all three come from this parse.
///
/// **BUG THIS CATCHES**: Would catch the value keeping its `&` prefix or the
/// flags bleeding into the name.
#[test]
fn given_read_only_variable_when_parsed_then_extracts_fields() {
    // GIVEN: A read-only variable suggestion
    let raw = "sv_gravity#r&800";

    // WHEN: Parsing
    let entry = AutocompleteEntry::parse(raw).expect("valid entry");

    // THEN: Each field is split out
    assert_eq!(entry.name, "sv_gravity");
    assert_eq!(entry.value, "800");
    assert!(entry.is_read_only);
    assert!(!entry.is_command);
}

/// **VALUE**: Verifies a command with no value and unknown flags parses.
///
/// **WHY THIS MATTERS**: The host may grow new flag characters; older consoles
/// should still list the suggestion.
///
/// **BUG THIS CATCHES**: Would catch a parser that rejects unknown flags or
/// treats a missing flag as present.
#[test]
fn given_command_with_unknown_flag_when_parsed_then_ignores_unknown_flag() {
    // GIVEN: A command with an extra unknown flag and an empty value
    let entry: AutocompleteEntry = "map#cz&".parse().expect("valid entry");

    // THEN: Command flag set, read-only not set, value empty
    assert_eq!(entry.name, "map");
    assert!(entry.is_command);
    assert!(!entry.is_read_only);
    assert!(entry.value.is_empty());
}

/// **VALUE**: Verifies malformed suggestions are rejected.
///
/// **WHY THIS MATTERS**: A malformed entry must be skipped rather than displayed
/// with garbage fields.
///
/// **BUG THIS CATCHES**: Would catch index arithmetic that slices out of order
/// when `&` precedes `#`.
#[test]
fn given_malformed_entries_when_parsed_then_returns_validation_error() {
    // GIVEN: Missing separators, reversed separators, empty name
    let cases = ["no_separators", "name#flags", "name&value", "a&b#c", "#r&1"];

    for raw in cases {
        // WHEN: Parsing
        let result = AutocompleteEntry::parse(raw);

        // THEN: Validation error
        assert!(
            matches!(result, Err(ModelError::Validation { .. })),
            "Should reject: {raw}"
        );
    }
}

/// **VALUE**: Verifies the wire form is the inverse of parsing.
///
/// **WHY THIS MATTERS**: Test hosts build `'L'` frames from entries; the text they
/// emit must parse back identically.
///
/// **BUG THIS CATCHES**: Would catch flag characters being dropped on output.
#[test]
fn given_entry_when_written_to_wire_then_parses_back() {
    // GIVEN: A read-only command (both flags)
    let entry = AutocompleteEntry::command("quit").with_read_only(true);

    // WHEN: Writing and re-parsing
    let wire = entry.to_wire();
    let parsed = AutocompleteEntry::parse(&wire).expect("valid entry");

    // THEN: Same entry
    assert_eq!(wire, "quit#cr&");
    assert_eq!(parsed, entry);
}

/// **VALUE**: Verifies the buffer splits commands from variables.
///
/// **WHY THIS MATTERS**: The autocomplete window renders the two groups separately.
///
/// **BUG THIS CATCHES**: Would catch an inverted filter.
#[test]
fn given_mixed_buffer_when_split_then_groups_by_kind() {
    // GIVEN: Two variables and one command
    let buffer: AutocompleteBuffer = vec![
        AutocompleteEntry::variable("fps_max", "144"),
        AutocompleteEntry::command("map"),
        AutocompleteEntry::variable("name", "player"),
    ]
    .into();

    // THEN: Groups are split
    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.commands().count(), 1);
    assert_eq!(buffer.variables().count(), 2);
    assert!(AutocompleteBuffer::empty().is_empty());
}
