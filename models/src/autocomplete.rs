//! Autocomplete suggestions pushed by the host.
//!
//! Each suggestion travels as `name#flags&value`, e.g. `sv_gravity#r&800` or
//! `map#c&`. Flags are single characters: `c` marks a command, `r` marks a
//! read-only variable. Unknown flag characters are ignored so the host can add
//! new ones without breaking older consoles.

use crate::{ErrorLocation, ModelError};

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::str::FromStr;

const FLAG_SEPARATOR: char = '#';
const VALUE_SEPARATOR: char = '&';
const FLAG_COMMAND: char = 'c';
const FLAG_READ_ONLY: char = 'r';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutocompleteEntry {
    pub name: String,
    pub is_command: bool,
    pub is_read_only: bool,
    pub value: String,
}

impl AutocompleteEntry {
    /// A console variable with its current value.
    pub fn variable(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// A command; commands carry no value.
    pub fn command(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_command: true,
            ..Default::default()
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.is_read_only = read_only;
        self
    }

    /// Parse one `name#flags&value` suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] if either separator is missing, if the
    /// value separator comes before the flag separator, or if the name is empty.
    #[track_caller]
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let (Some(flag_position), Some(value_position)) =
            (raw.find(FLAG_SEPARATOR), raw.find(VALUE_SEPARATOR))
        else {
            return Err(ModelError::Validation {
                message: format!("Autocomplete entry '{raw}' is missing '#' or '&'"),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        if value_position < flag_position {
            return Err(ModelError::Validation {
                message: format!("Autocomplete entry '{raw}' has '&' before '#'"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let name = &raw[..flag_position];
        if name.is_empty() {
            return Err(ModelError::Validation {
                message: format!("Autocomplete entry '{raw}' has an empty name"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let flags = &raw[flag_position + FLAG_SEPARATOR.len_utf8()..value_position];
        let value = &raw[value_position + VALUE_SEPARATOR.len_utf8()..];

        Ok(Self {
            name: name.to_string(),
            is_command: flags.contains(FLAG_COMMAND),
            is_read_only: flags.contains(FLAG_READ_ONLY),
            value: value.to_string(),
        })
    }

    /// Wire representation, the inverse of [`AutocompleteEntry::parse`].
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl FromStr for AutocompleteEntry {
    type Err = ModelError;

    #[track_caller]
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl Display for AutocompleteEntry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}{FLAG_SEPARATOR}", self.name)?;
        if self.is_command {
            write!(formatter, "{FLAG_COMMAND}")?;
        }
        if self.is_read_only {
            write!(formatter, "{FLAG_READ_ONLY}")?;
        }
        write!(formatter, "{VALUE_SEPARATOR}{}", self.value)
    }
}

/// Point-in-time snapshot of every suggestion for the current input.
///
/// A new buffer always replaces the previous one wholesale; buffers are never
/// merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutocompleteBuffer {
    entries: Vec<AutocompleteEntry>,
}

impl AutocompleteBuffer {
    pub fn new(entries: Vec<AutocompleteEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[AutocompleteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn commands(&self) -> impl Iterator<Item = &AutocompleteEntry> {
        self.entries.iter().filter(|entry| entry.is_command)
    }

    pub fn variables(&self) -> impl Iterator<Item = &AutocompleteEntry> {
        self.entries.iter().filter(|entry| !entry.is_command)
    }
}

impl From<Vec<AutocompleteEntry>> for AutocompleteBuffer {
    fn from(entries: Vec<AutocompleteEntry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<AutocompleteEntry> for AutocompleteBuffer {
    fn from_iter<I: IntoIterator<Item = AutocompleteEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
