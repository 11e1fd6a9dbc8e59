use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::defaults::{self, DefaultsSnapshot};
use crate::errors::ConfigError;
use crate::jitter::{JitterSource, ThreadRngJitter};

use super::{Rescue, RetryExecutor, RetryPlan};

/// Observer invoked once per retried failure with the error, the 1-based
/// attempt that failed and the time elapsed since the execution started.
pub type OnRetry<E> = Arc<dyn Fn(&E, u32, Duration) + Send + Sync>;

/// Per-call overrides. Unset numeric fields and the sleep switch fall back to
/// the process-wide [`defaults`](crate::defaults) at the time of
/// [`build`](RetryOptions::build).
pub struct RetryOptions<E> {
    max_attempts: Option<u32>,
    base_delay: Option<Duration>,
    max_delay: Option<Duration>,
    sleep_enabled: Option<bool>,
    rescue: Rescue<E>,
    on_retry: Option<OnRetry<E>>,
    clock: Option<Arc<dyn Clock>>,
    jitter: Option<Arc<dyn JitterSource>>,
    label: Option<Cow<'static, str>>,
}

impl<E> RetryOptions<E> {
    pub fn new() -> Self {
        Self {
            max_attempts: None,
            base_delay: None,
            max_delay: None,
            sleep_enabled: None,
            rescue: Rescue::any(),
            on_retry: None,
            clock: None,
            jitter: None,
            label: None,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Override the process-wide sleep switch for this call only.
    pub fn sleep_enabled(mut self, enabled: bool) -> Self {
        self.sleep_enabled = Some(enabled);
        self
    }

    pub fn rescue(mut self, rescue: Rescue<E>) -> Self {
        self.rescue = rescue;
        self
    }

    pub fn on_retry<F>(mut self, observer: F) -> Self
    where
        F: Fn(&E, u32, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(observer));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Name reported as `operation` in log events.
    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Merge onto the current process-wide defaults and validate.
    pub fn build(self) -> Result<RetryExecutor<E>, ConfigError> {
        self.resolve(defaults::snapshot())
    }

    pub(crate) fn resolve(
        self,
        snapshot: DefaultsSnapshot,
    ) -> Result<RetryExecutor<E>, ConfigError> {
        let plan = RetryPlan::new(
            self.max_attempts.unwrap_or(snapshot.defaults.max_attempts),
            self.base_delay.unwrap_or(snapshot.defaults.base_delay),
            self.max_delay.unwrap_or(snapshot.defaults.max_delay),
            self.sleep_enabled.unwrap_or(snapshot.sleep_enabled),
        )?;
        Ok(RetryExecutor::from_parts(
            plan,
            self.rescue,
            self.on_retry,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.jitter.unwrap_or_else(|| Arc::new(ThreadRngJitter)),
            self.label.unwrap_or(Cow::Borrowed("operation")),
        ))
    }
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("sleep_enabled", &self.sleep_enabled)
            .field("rescue", &self.rescue)
            .field("on_retry", &self.on_retry.is_some())
            .field("label", &self.label)
            .finish()
    }
}
