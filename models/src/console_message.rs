use crate::Severity;

/// One line in the operator's log.
///
/// Either decoded from a host frame or synthesized locally as a status line.
/// Fields are private so a message cannot change after it has been handed to
/// the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleMessage {
    text: String,
    time_submitted: f32,
    severity: Severity,
}

impl ConsoleMessage {
    pub fn new(text: impl Into<String>, time_submitted: f32, severity: Severity) -> Self {
        Self {
            text: text.into(),
            time_submitted,
            severity,
        }
    }

    /// Informational line produced by the client itself.
    pub fn status(text: impl Into<String>, time_submitted: f32) -> Self {
        Self::new(text, time_submitted, Severity::Info)
    }

    /// Markup-annotated body (`$y`, `$g`, ... colour escapes are left untouched).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Seconds since the producing side started.
    pub fn time_submitted(&self) -> f32 {
        self.time_submitted
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
