use std::time::Duration;

/// Timing knobs for the connection loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// How long one connection attempt may wait for the host.
    pub connect_timeout: Duration,
    /// Pause between failed connection attempts.
    pub retry_delay: Duration,
    /// Pause before the very first attempt, covering the host start-up race.
    pub startup_delay: Duration,
    /// Polls performed after a graceful disconnect before tearing down.
    pub drain_rounds: u32,
    pub drain_round_timeout: Duration,
    /// Sleep while connected when a poll returned nothing.
    pub idle_sleep: Duration,
    /// Messages delivered in one go before pausing for the presentation layer.
    pub batch_size: usize,
    pub batch_pause: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(1500),
            retry_delay: Duration::from_millis(1000),
            startup_delay: Duration::from_millis(1000),
            drain_rounds: 10,
            drain_round_timeout: Duration::from_millis(20),
            idle_sleep: Duration::from_millis(5),
            batch_size: 15,
            batch_pause: Duration::from_millis(2),
        }
    }
}
