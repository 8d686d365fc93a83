//! Exponential reconnect backoff
//!
//! ```text
//! delay(n) = base_delay_ms × growth_factor^(n − 1),  n = 1..=max_attempts
//! ```
//!
//! With the defaults this gives 1000, 1500, 2250, 3375, 5062.5 ms, after
//! which the ingestor gives up and reports `Failed`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound for a single backoff sleep
pub const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Consecutive failed attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: f64,
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            growth_factor: default_growth_factor(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> f64 {
    1000.0
}

fn default_growth_factor() -> f64 {
    1.5
}

impl ReconnectPolicy {
    /// Delay before attempt `attempt` (1-based), in milliseconds
    pub fn delay_ms(&self, attempt: u32) -> f64 {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.base_delay_ms * self.growth_factor.powi(exponent)
    }

    /// Delay before attempt `attempt`, saturating at [`MAX_DELAY`]
    pub fn delay(&self, attempt: u32) -> Duration {
        let ms = self.delay_ms(attempt);
        if ms.is_nan() || ms <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(ms / 1_000.0)
            .unwrap_or(MAX_DELAY)
            .min(MAX_DELAY)
    }

    /// The whole schedule, one entry per allowed attempt
    pub fn delays_ms(&self) -> Vec<f64> {
        (1..=self.max_attempts).map(|n| self.delay_ms(n)).collect()
    }

    /// True once `attempt` exceeds the allowed number of attempts
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt > self.max_attempts
    }
}
