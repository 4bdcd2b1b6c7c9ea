//! Reconnect backoff
//!
//! Exponential delay with symmetric jitter, matching the Socket.IO client: the n-th
//! attempt waits `base * 2^(n-1)`, shifted up or down by a random share of itself, and
//! never longer than `max`.

use pulse_common::RealtimeConfig;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base: Duration,
    pub max: Duration,
    /// Share of the delay that may be added or removed, in `[0, 1]`
    pub jitter: f64,
}

impl ReconnectPolicy {
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            max_attempts: config.reconnect_attempts,
            base: config.reconnect_delay(),
            max: config.reconnect_delay_max(),
            jitter: config.randomization_factor,
        }
    }

    /// Whether another attempt is allowed after `attempt` reconnects
    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }

    /// Delay before reconnect attempt `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.delay_with(attempt, &mut rand::thread_rng())
    }

    pub fn delay_with<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let raw = self.base.as_millis() as f64 * f64::from(1u32 << exponent);

        let ms = if self.jitter > 0.0 {
            let roll: f64 = rng.gen();
            let deviation = (roll * self.jitter * raw).floor();
            if (roll * 10.0).floor() as u64 % 2 == 0 {
                raw - deviation
            } else {
                raw + deviation
            }
        } else {
            raw
        };

        Duration::from_millis(ms.max(0.0) as u64).min(self.max)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&RealtimeConfig::default())
    }
}
