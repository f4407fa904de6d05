//! Status lines the console writes into its own log.
//!
//! The `$y` / `$g` / `$r` prefixes are colour markup for the rendering layer.

const PREFIX: &str = "$y[DevConsoleApp] ";

pub(crate) const CONNECTED: &str = "$y[DevConsoleApp] $gSuccessfully connected to the host";
pub(crate) const CONNECTION_FAILED: &str = "$y[DevConsoleApp] Connection failed";
pub(crate) const DISCONNECTED: &str = "$y[DevConsoleApp] Disconnected!";
pub(crate) const SHUTTING_DOWN: &str = "$y[DevConsoleApp] Closing connection";

pub(crate) fn trying_connection(address: &str) -> String {
    format!("{PREFIX}Trying connection... ({address})")
}

pub(crate) fn fatal(reason: &str) -> String {
    format!("{PREFIX}$rCannot reach the network: {reason}")
}
