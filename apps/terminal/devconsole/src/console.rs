//! Line-oriented presentation layer.
//!
//! Prints each delivered message behind a `mmm:ss.sss` time column. Markup
//! such as `$y` is printed as-is.

use console_core::bridge::RenderingSurface;

use std::io::Write;

use log::warn;
use models::{AutocompleteBuffer, ConsoleMessage};

pub const QUIT_COMMAND: &str = "!quit";

/// Prefix that turns a line into an autocomplete query instead of a command.
pub const AUTOCOMPLETE_PREFIX: char = '?';

pub const BANNER: [&str; 2] = [
    "$y[DevConsoleApp] $gInitialised developer console app",
    "$y[DevConsoleApp] $gType '!quit' to quit this console",
];

pub const SHUTDOWN_LINE: &str = "$y[DevConsoleApp] $gGracefully shutting down...";

/// What the operator asked for with one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    Quit,
    Command(String),
    Autocomplete(String),
    /// Nothing typed.
    Empty,
    /// Rejected line, kept for the error message.
    Invalid(String),
}

impl OperatorInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if line == QUIT_COMMAND {
            return OperatorInput::Quit;
        }

        if line.is_empty() {
            return OperatorInput::Empty;
        }

        if line.starts_with([' ', '\t']) {
            return OperatorInput::Invalid(line.to_string());
        }

        match line.strip_prefix(AUTOCOMPLETE_PREFIX) {
            Some(query) if query.is_empty() || query.starts_with([' ', '\t']) => {
                OperatorInput::Invalid(line.to_string())
            }
            Some(query) => OperatorInput::Autocomplete(query.to_string()),
            None => OperatorInput::Command(line.to_string()),
        }
    }
}

/// Status line shown for a rejected input line.
pub fn invalid_command_line(input: &str) -> String {
    format!("$yInvalid command: '{input}'")
}

/// `mmm:ss.sss` for a timestamp in seconds, e.g. `002:05.250` for 125.25.
pub fn format_time(seconds: f32) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let whole = seconds.trunc();
    let minutes = (whole / 60.0).trunc();
    let remainder = seconds - minutes * 60.0;
    format!("{:03}:{:06.3}", minutes as u32, remainder)
}

/// [`RenderingSurface`] that writes lines to any [`Write`].
pub struct PlainConsole<W: Write> {
    out: W,
    autocomplete: AutocompleteBuffer,
    awaiting_autocomplete: bool,
}

impl<W: Write> PlainConsole<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            autocomplete: AutocompleteBuffer::empty(),
            awaiting_autocomplete: false,
        }
    }

    /// Print the next autocomplete result the host sends.
    pub fn expect_autocomplete(&mut self) {
        self.awaiting_autocomplete = true;
    }

    pub fn autocomplete(&self) -> &AutocompleteBuffer {
        &self.autocomplete
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("Failed to write console line: {e}");
        }
    }

    fn print_autocomplete(&mut self) {
        if self.autocomplete.is_empty() {
            self.write_line("Autocomplete: none");
            return;
        }

        let commands = self
            .autocomplete
            .commands()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let variables: Vec<String> = self
            .autocomplete
            .variables()
            .map(|entry| {
                let marker = if entry.is_read_only { " (read-only)" } else { "" };
                format!("{} = {}{marker}", entry.name, entry.value)
            })
            .collect();

        self.write_line("Autocomplete:");
        if !commands.is_empty() {
            self.write_line(&format!("  commands: {commands}"));
        }
        for variable in variables {
            self.write_line(&format!("  {variable}"));
        }
    }
}

impl<W: Write> RenderingSurface for PlainConsole<W> {
    fn on_log(&mut self, message: ConsoleMessage) {
        let line = format!("{} {}", format_time(message.time_submitted()), message.text());
        self.write_line(&line);
    }

    fn set_autocomplete_buffer(&mut self, buffer: AutocompleteBuffer) {
        self.autocomplete = buffer;
        if std::mem::take(&mut self.awaiting_autocomplete) {
            self.print_autocomplete();
        }
    }
}
