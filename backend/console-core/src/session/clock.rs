use std::time::{Duration, Instant};

/// Time base for lines the console writes itself.
///
/// Created once with [`SessionClock::init`] when the session starts and passed
/// to whoever needs to stamp a message; there is no process-wide start time.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started: Instant,
}

impl SessionClock {
    pub fn init() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Seconds since [`SessionClock::init`], in the unit `ConsoleMessage` uses.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}
