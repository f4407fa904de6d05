use models::{AutocompleteBuffer, ConsoleMessage};

/// Presentation layer fed by [`ConsoleBridge::pump`](crate::bridge::ConsoleBridge::pump).
pub trait RenderingSurface {
    /// Append one line to the operator's log.
    fn on_log(&mut self, message: ConsoleMessage);

    /// Replace the cached autocomplete suggestions wholesale.
    fn set_autocomplete_buffer(&mut self, buffer: AutocompleteBuffer);
}
