use crate::console::{OperatorInput, PlainConsole, format_time, invalid_command_line};

use console_core::bridge::RenderingSurface;

use models::{AutocompleteBuffer, AutocompleteEntry, ConsoleMessage, Severity};

fn output(console: PlainConsole<Vec<u8>>) -> String {
    String::from_utf8(console.into_inner()).expect("utf8 output")
}

/// **VALUE**: Verifies the time column matches `mmm:ss.sss`.
///
/// **WHY THIS MATTERS**: Operators line up host events by this column.
///
/// **BUG THIS CATCHES**: Would catch minutes not wrapping seconds or missing
/// zero padding.
#[test]
fn given_timestamps_when_formatted_then_uses_minutes_and_padded_seconds() {
    assert_eq!(format_time(0.0), "000:00.000");
    assert_eq!(format_time(12.5), "000:12.500");
    assert_eq!(format_time(125.25), "002:05.250");
    assert_eq!(format_time(3600.0), "060:00.000");
}

/// **VALUE**: Verifies nonsense timestamps from the host do not break the column.
///
/// **WHY THIS MATTERS**: The timestamp comes off the wire unchecked.
///
/// **BUG THIS CATCHES**: Would catch "NaN" or negative minutes in the output.
#[test]
fn given_negative_or_nan_timestamp_when_formatted_then_clamps_to_zero() {
    assert_eq!(format_time(-4.0), "000:00.000");
    assert_eq!(format_time(f32::NAN), "000:00.000");
    assert_eq!(format_time(f32::INFINITY), "000:00.000");
}

/// **VALUE**: Verifies input classification follows the console rules.
///
/// **WHY THIS MATTERS**: Leading whitespace and empty lines are never sent to
/// the host; `!quit` never reaches it either.
///
/// **BUG THIS CATCHES**: Would catch `!quit` being forwarded as a command or
/// whitespace being trimmed instead of rejected.
#[test]
fn given_operator_lines_when_parsed_then_classified() {
    assert_eq!(OperatorInput::parse("!quit"), OperatorInput::Quit);
    assert_eq!(OperatorInput::parse("!quit\r\n"), OperatorInput::Quit);
    assert_eq!(OperatorInput::parse(""), OperatorInput::Empty);
    assert_eq!(
        OperatorInput::parse(" map"),
        OperatorInput::Invalid(" map".to_string())
    );
    assert_eq!(
        OperatorInput::parse("\tmap"),
        OperatorInput::Invalid("\tmap".to_string())
    );
    assert_eq!(
        OperatorInput::parse("map dm1"),
        OperatorInput::Command("map dm1".to_string())
    );
    assert_eq!(
        OperatorInput::parse("?sv_"),
        OperatorInput::Autocomplete("sv_".to_string())
    );
    assert_eq!(
        OperatorInput::parse("?"),
        OperatorInput::Invalid("?".to_string())
    );
}

/// **VALUE**: Verifies messages print with the time column and raw markup.
///
/// **WHY THIS MATTERS**: This front end does no colour rendering; markup must
/// survive so it can be piped into something that does.
///
/// **BUG THIS CATCHES**: Would catch markup being stripped or the time column
/// missing.
#[test]
fn given_message_when_logged_then_prints_time_and_verbatim_text() {
    // GIVEN
    let mut console = PlainConsole::new(Vec::new());

    // WHEN
    console.on_log(ConsoleMessage::new("$rboom", 12.5, Severity::Error));
    console.on_log(ConsoleMessage::status(invalid_command_line(" x"), 0.0));

    // THEN
    assert_eq!(
        output(console),
        "000:12.500 $rboom\n000:00.000 $yInvalid command: ' x'\n"
    );
}

/// **VALUE**: Verifies suggestions print only when the operator asked for them.
///
/// **WHY THIS MATTERS**: The session clears suggestions on every disconnect;
/// printing each clear would spam the console.
///
/// **BUG THIS CATCHES**: Would catch unsolicited autocomplete output.
#[test]
fn given_autocomplete_results_when_requested_then_prints_once() {
    // GIVEN
    let mut console = PlainConsole::new(Vec::new());
    let buffer = AutocompleteBuffer::new(vec![
        AutocompleteEntry::command("map"),
        AutocompleteEntry::variable("sv_gravity", "800").with_read_only(true),
    ]);

    // WHEN: One unsolicited update, then one requested, then another unsolicited
    console.set_autocomplete_buffer(AutocompleteBuffer::empty());
    console.expect_autocomplete();
    console.set_autocomplete_buffer(buffer.clone());
    console.set_autocomplete_buffer(buffer.clone());

    // THEN
    assert_eq!(console.autocomplete(), &buffer);
    assert_eq!(
        output(console),
        "Autocomplete:\n  commands: map\n  sv_gravity = 800 (read-only)\n"
    );
}

/// **VALUE**: Verifies several command suggestions print on one line in host order.
///
/// **WHY THIS MATTERS**: Command names are gathered from the buffer and then
/// written out; both steps go through the same console.
///
/// **BUG THIS CATCHES**: Would catch dropped or reordered command names when a
/// list holds more than one command.
#[test]
fn given_several_commands_when_printed_then_joins_them_in_order() {
    // GIVEN
    let mut console = PlainConsole::new(Vec::new());
    let buffer = AutocompleteBuffer::new(vec![
        AutocompleteEntry::command("map"),
        AutocompleteEntry::command("quit"),
        AutocompleteEntry::command("restart"),
    ]);

    // WHEN
    console.expect_autocomplete();
    console.set_autocomplete_buffer(buffer);

    // THEN
    assert_eq!(output(console), "Autocomplete:\n  commands: map, quit, restart\n");
}
