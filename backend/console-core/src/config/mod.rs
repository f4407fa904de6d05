use crate::error::config::ConfigError;
use crate::session::SessionSettings;

use common::ErrorLocation;

use std::net::Ipv6Addr;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use const_format::concatcp;
use log::{debug, info, warn};
use models::ConnectionState;
use serde::{Deserialize, Serialize};
use url::Host;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "devconsole";
const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_HOST_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_HOST_PORT: u16 = 23005;
pub const DEFAULT_ENDPOINT: &str = concatcp!(DEFAULT_HOST_ADDRESS, ":", DEFAULT_HOST_PORT);

pub const ENV_HOST: &str = "DEVCONSOLE_HOST";
pub const ENV_PORT: &str = "DEVCONSOLE_PORT";

const MAX_TIMEOUT_MS: u64 = 60_000;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
    #[serde(default = "default_drain_rounds")]
    pub drain_rounds: u32,
    #[serde(default = "default_drain_round_timeout_ms")]
    pub drain_round_timeout_ms: u64,
    #[serde(default = "default_idle_sleep_ms")]
    pub idle_sleep_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            startup_delay_ms: default_startup_delay_ms(),
            drain_rounds: default_drain_rounds(),
            drain_round_timeout_ms: default_drain_round_timeout_ms(),
            idle_sleep_ms: default_idle_sleep_ms(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    /// Presentation ticks per second while connected.
    #[serde(default = "default_connected_poll_hz")]
    pub connected_poll_hz: u32,
    /// Presentation ticks per second while looking for the host.
    #[serde(default = "default_searching_poll_hz")]
    pub searching_poll_hz: u32,
    #[serde(default = "default_message_capacity")]
    pub message_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            connected_poll_hz: default_connected_poll_hz(),
            searching_poll_hz: default_searching_poll_hz(),
            message_capacity: default_message_capacity(),
        }
    }
}

impl UiConfig {
    /// Tick interval for the presentation loop in `state`.
    pub fn poll_interval(&self, state: ConnectionState) -> Duration {
        let hz = if state.is_connected() {
            self.connected_poll_hz
        } else {
            self.searching_poll_hz
        };
        Duration::from_millis(1000 / u64::from(hz.max(1)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            host: HostConfig::default(),
            connection: ConnectionConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_address() -> String {
    DEFAULT_HOST_ADDRESS.to_string()
}
fn default_port() -> u16 {
    DEFAULT_HOST_PORT
}
fn default_connect_timeout_ms() -> u64 {
    1500
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_startup_delay_ms() -> u64 {
    1000
}
fn default_drain_rounds() -> u32 {
    10
}
fn default_drain_round_timeout_ms() -> u64 {
    20
}
fn default_idle_sleep_ms() -> u64 {
    5
}
fn default_batch_size() -> usize {
    15
}
fn default_batch_pause_ms() -> u64 {
    2
}
fn default_connected_poll_hz() -> u32 {
    20
}
fn default_searching_poll_hz() -> u32 {
    1
}
fn default_message_capacity() -> usize {
    crate::bridge::DEFAULT_MESSAGE_CAPACITY
}

// ============================================
// IMPLEMENTATION
// ============================================

/// Load a `.env` file from the working directory or its parents, if any.
///
/// Variables already set in the process environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {e}"),
    }
}

/// `{platform config dir}/devconsole`, or `None` if the platform has no config dir.
pub fn default_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
}

impl ConsoleConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(ConsoleConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        let config: ConsoleConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// the write or the rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Apply `DEVCONSOLE_HOST` / `DEVCONSOLE_PORT` on top of the loaded values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvOverride`] if a variable is set but unusable.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(address) = std::env::var(ENV_HOST) {
            if address.trim().is_empty() {
                return Err(ConfigError::EnvOverride {
                    location: ErrorLocation::from(Location::caller()),
                    variable: ENV_HOST,
                    value: address,
                    reason: "address cannot be empty".to_string(),
                });
            }
            debug!("{ENV_HOST} overrides host address with {address}");
            self.host.address = address.trim().to_string();
        }

        if let Ok(value) = std::env::var(ENV_PORT) {
            let port = value.trim().parse::<u16>().map_err(|e| ConfigError::EnvOverride {
                location: ErrorLocation::from(Location::caller()),
                variable: ENV_PORT,
                value: value.clone(),
                reason: e.to_string(),
            })?;
            debug!("{ENV_PORT} overrides host port with {port}");
            self.host.port = port;
        }

        self.validate()
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation_error(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.host.address.trim().is_empty() {
            return Err(validation_error("host.address cannot be empty".to_string()));
        }

        if self.host.port == 0 {
            return Err(validation_error("host.port cannot be 0".to_string()));
        }

        let connection = &self.connection;
        for (name, value) in [
            ("connect_timeout_ms", connection.connect_timeout_ms),
            ("retry_delay_ms", connection.retry_delay_ms),
            ("drain_round_timeout_ms", connection.drain_round_timeout_ms),
        ] {
            if value == 0 || value > MAX_TIMEOUT_MS {
                return Err(validation_error(format!(
                    "Invalid connection.{name}: {value} (must be 1-{MAX_TIMEOUT_MS})"
                )));
            }
        }

        if connection.startup_delay_ms > MAX_TIMEOUT_MS {
            return Err(validation_error(format!(
                "Invalid connection.startup_delay_ms: {} (must be at most {MAX_TIMEOUT_MS})",
                connection.startup_delay_ms
            )));
        }

        if connection.drain_rounds == 0 {
            return Err(validation_error("connection.drain_rounds cannot be 0".to_string()));
        }

        if connection.batch_size == 0 {
            return Err(validation_error("connection.batch_size cannot be 0".to_string()));
        }

        if self.ui.connected_poll_hz == 0 || self.ui.searching_poll_hz == 0 {
            return Err(validation_error("ui poll rates cannot be 0".to_string()));
        }

        if self.ui.message_capacity == 0 {
            return Err(validation_error("ui.message_capacity cannot be 0".to_string()));
        }

        let host = self.host_literal();
        Host::parse(&host).map_err(|e| {
            validation_error(format!("Invalid host.address {host}: {e}"))
        })?;

        Ok(())
    }

    /// `address:port` of the host, e.g. `127.0.0.1:23005` or `[::1]:23005`.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host_literal(), self.host.port)
    }

    /// The configured address, with IPv6 literals in brackets.
    fn host_literal(&self) -> String {
        let address = self.host.address.trim();
        match address.parse::<Ipv6Addr>() {
            Ok(_) => format!("[{address}]"),
            Err(_) => address.to_string(),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        let connection = &self.connection;
        SessionSettings {
            connect_timeout: Duration::from_millis(connection.connect_timeout_ms),
            retry_delay: Duration::from_millis(connection.retry_delay_ms),
            startup_delay: Duration::from_millis(connection.startup_delay_ms),
            drain_rounds: connection.drain_rounds,
            drain_round_timeout: Duration::from_millis(connection.drain_round_timeout_ms),
            idle_sleep: Duration::from_millis(connection.idle_sleep_ms),
            batch_size: connection.batch_size,
            batch_pause: Duration::from_millis(connection.batch_pause_ms),
        }
    }
}

#[track_caller]
fn validation_error(reason: String) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason,
    }
}
