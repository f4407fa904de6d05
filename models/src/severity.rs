use crate::{ErrorLocation, ModelError};

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;

/// Ordinal classification of a console message, least to most severe.
///
/// The discriminant is the single byte carried on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    #[default]
    Info = 0,
    Developer = 1,
    Verbose = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl Severity {
    /// Every level in ascending order.
    pub const ALL: [Severity; 6] = [
        Severity::Info,
        Severity::Developer,
        Severity::Verbose,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Severity {
    type Error = ModelError;

    #[track_caller]
    fn try_from(byte: u8) -> Result<Self, ModelError> {
        Severity::ALL
            .get(usize::from(byte))
            .copied()
            .ok_or_else(|| ModelError::Validation {
                message: format!("Severity byte {byte} is outside 0-5"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl Display for Severity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            Severity::Info => "Info",
            Severity::Developer => "Developer",
            Severity::Verbose => "Verbose",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        };
        formatter.write_str(name)
    }
}
