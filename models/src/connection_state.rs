use std::fmt::{Display, Formatter, Result as FormatResult};

/// Lifecycle of the single host connection.
///
/// Written only by the connection loop; `Inactive` is the one state the owner
/// may force from outside, and it means "shut down".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Inactive,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    pub fn is_active(self) -> bool {
        self != ConnectionState::Inactive
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl Display for ConnectionState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            ConnectionState::Inactive => "Inactive",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnecting => "Disconnecting",
        };
        formatter.write_str(name)
    }
}
