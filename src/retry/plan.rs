use std::time::Duration;

use crate::errors::ConfigError;
use crate::jitter::JitterSource;

/// Validated attempt budget and backoff bounds for one execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPlan {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    sleep_enabled: bool,
}

impl RetryPlan {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        sleep_enabled: bool,
    ) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::MaxAttempts(0));
        }
        if base_delay > max_delay {
            return Err(ConfigError::DelayOrder {
                base: base_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            max_attempts,
            base_delay,
            max_delay,
            sleep_enabled,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// When false, delays are computed but never waited.
    pub fn sleep_enabled(&self) -> bool {
        self.sleep_enabled
    }

    /// Wait after failed attempt `attempt` (1-based) for a jitter draw in `[0, 1)`.
    /// Draws outside `[0, 1]` are clamped into it and a non-finite draw counts
    /// as `0`, so `1.0` itself yields the capped raw delay.
    ///
    /// ```text
    /// raw      = min(base * 2^(attempt - 1), max)
    /// jittered = raw * (0.5 + 0.5 * draw)
    /// delay    = max(base, jittered)
    /// ```
    ///
    /// The result always lies in `[base_delay, max_delay]`.
    pub fn backoff(&self, attempt: u32, draw: f64) -> Duration {
        let draw = if draw.is_finite() {
            draw.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let raw = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay));
        let factor = 0.5 + 0.5 * draw;
        let jittered = match u64::try_from(raw.as_nanos()) {
            Ok(nanos) => Duration::from_nanos((nanos as f64 * factor).round() as u64),
            Err(_) => raw.mul_f64(factor),
        };
        jittered.min(raw).max(self.base_delay)
    }

    pub fn delay_for_attempt(&self, attempt: u32, jitter: &dyn JitterSource) -> Duration {
        self.backoff(attempt, jitter.draw())
    }
}
