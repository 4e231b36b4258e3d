//! Sync client configuration

use std::time::Duration;

/// Reconnect backoff defaults
const BASE_DELAY_MS: u64 = 1000;
const MULTIPLIER: f64 = 1.5;
const MAX_DELAY_MS: u64 = 30_000;
const JITTER: f64 = 0.10;
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Sync client configuration
///
/// Defaults: 1 s base delay growing 1.5x per attempt, capped at 30 s,
/// +/-10% jitter, 10 attempts before giving up.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Delay growth factor per failed attempt
    pub multiplier: f64,
    /// Upper bound for a single delay (before jitter)
    pub max_delay: Duration,
    /// Jitter fraction applied to each delay (0.10 = +/-10%)
    pub jitter: f64,
    /// Reconnect attempts before the backoff loop reports failure
    pub max_attempts: u32,
}

impl SyncConfig {
    /// Create a configuration with the default backoff schedule
    pub fn new() -> Self {
        Self {
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            multiplier: MULTIPLIER,
            max_delay: Duration::from_millis(MAX_DELAY_MS),
            jitter: JITTER,
            max_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }

    /// Set the base delay
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the delay growth factor
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the delay cap
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the jitter fraction
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the attempt limit
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
