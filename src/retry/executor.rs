use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::jitter::JitterSource;
use crate::telemetry::retry::RetryTelemetry;

use super::options::OnRetry;
use super::{OutcomeStatus, Rescue, RetryOutcome, RetryPlan};

/// Drives the attempt loop for a validated configuration.
///
/// Built from [`RetryOptions`](super::RetryOptions). An executor can be reused;
/// every call to [`execute`](Self::execute) tracks its own attempt count and
/// start time.
///
/// The process-wide defaults and sleep switch are read once, in
/// [`RetryOptions::build`](super::RetryOptions::build). Later changes to them
/// do not reach an executor that already exists; build a new one, or use
/// [`with_retries`](crate::with_retries), which builds per call.
pub struct RetryExecutor<E> {
    plan: RetryPlan,
    rescue: Rescue<E>,
    on_retry: Option<OnRetry<E>>,
    clock: Arc<dyn Clock>,
    jitter: Arc<dyn JitterSource>,
    label: Cow<'static, str>,
}

impl<E> RetryExecutor<E> {
    pub(crate) fn from_parts(
        plan: RetryPlan,
        rescue: Rescue<E>,
        on_retry: Option<OnRetry<E>>,
        clock: Arc<dyn Clock>,
        jitter: Arc<dyn JitterSource>,
        label: Cow<'static, str>,
    ) -> Self {
        Self {
            plan,
            rescue,
            on_retry,
            clock,
            jitter,
            label,
        }
    }

    pub fn plan(&self) -> &RetryPlan {
        &self.plan
    }

    pub fn rescue(&self) -> &Rescue<E> {
        &self.rescue
    }
}

impl<E: Debug> RetryExecutor<E> {
    /// Run `op` until it succeeds, fails with an error outside the rescue set,
    /// or has been attempted `max_attempts` times. Backoff waits block the
    /// calling thread.
    ///
    /// The error of the final attempt is returned as is.
    pub fn execute<T, F>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
    {
        let telemetry = self.start_telemetry();
        let start = self.clock.now();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let delay = match op(attempt) {
                Ok(value) => {
                    self.finish(&telemetry, attempt, OutcomeStatus::Succeeded, start);
                    return Ok(value);
                }
                Err(err) => self.handle_failure(err, attempt, start, &telemetry)?,
            };
            if self.plan.sleep_enabled() {
                std::thread::sleep(delay);
            }
        }
    }

    /// Same loop as [`execute`](Self::execute), awaiting `tokio::time::sleep`
    /// between attempts instead of blocking the thread.
    pub async fn execute_async<T, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let telemetry = self.start_telemetry();
        let start = self.clock.now();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let delay = match op(attempt).await {
                Ok(value) => {
                    self.finish(&telemetry, attempt, OutcomeStatus::Succeeded, start);
                    return Ok(value);
                }
                Err(err) => self.handle_failure(err, attempt, start, &telemetry)?,
            };
            if self.plan.sleep_enabled() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    fn start_telemetry(&self) -> RetryTelemetry {
        let telemetry = RetryTelemetry::new(self.label.clone());
        telemetry.emit_start(self.plan.max_attempts(), self.plan.sleep_enabled());
        telemetry
    }

    /// Returns the backoff to apply before the next attempt, or hands the
    /// error back when the loop must stop.
    fn handle_failure(
        &self,
        err: E,
        attempt: u32,
        start: Instant,
        telemetry: &RetryTelemetry,
    ) -> Result<Duration, E> {
        if !self.rescue.matches(&err) {
            telemetry.emit_rejected(attempt, &err);
            self.finish(telemetry, attempt, OutcomeStatus::NotRetryable, start);
            return Err(err);
        }
        if attempt >= self.plan.max_attempts() {
            self.finish(telemetry, attempt, OutcomeStatus::Exhausted, start);
            return Err(err);
        }

        let elapsed = self.elapsed_since(start);
        if let Some(on_retry) = &self.on_retry {
            on_retry(&err, attempt, elapsed);
        }
        let delay = self.plan.delay_for_attempt(attempt, self.jitter.as_ref());
        telemetry.emit_retry(attempt, self.plan.max_attempts(), delay, elapsed, &err);
        Ok(delay)
    }

    fn finish(
        &self,
        telemetry: &RetryTelemetry,
        attempts: u32,
        status: OutcomeStatus,
        start: Instant,
    ) {
        telemetry.emit_outcome(&RetryOutcome {
            attempts,
            status,
            elapsed: self.elapsed_since(start),
        });
    }

    fn elapsed_since(&self, start: Instant) -> Duration {
        self.clock.now().saturating_duration_since(start)
    }
}

impl<E> Clone for RetryExecutor<E> {
    fn clone(&self) -> Self {
        Self {
            plan: self.plan,
            rescue: self.rescue.clone(),
            on_retry: self.on_retry.clone(),
            clock: Arc::clone(&self.clock),
            jitter: Arc::clone(&self.jitter),
            label: self.label.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryExecutor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("plan", &self.plan)
            .field("rescue", &self.rescue)
            .field("on_retry", &self.on_retry.is_some())
            .field("label", &self.label)
            .finish()
    }
}
