use std::borrow::Cow;
use std::fmt::Debug;
use std::time::Duration;

use tracing::{Level, event};
use uuid::Uuid;

use crate::retry::RetryOutcome;

/// Structured events for a single execution, correlated by `execution_id`.
#[derive(Clone, Debug)]
pub(crate) struct RetryTelemetry {
    execution_id: Uuid,
    operation: Cow<'static, str>,
}

impl RetryTelemetry {
    pub fn new(operation: Cow<'static, str>) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            operation,
        }
    }

    pub fn emit_start(&self, max_attempts: u32, sleep_enabled: bool) {
        event!(
            Level::DEBUG,
            execution_id = %self.execution_id,
            operation = %self.operation,
            max_attempts,
            sleep_enabled,
            "retry.start"
        );
    }

    pub fn emit_retry(
        &self,
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
        elapsed: Duration,
        error: &dyn Debug,
    ) {
        event!(
            Level::WARN,
            execution_id = %self.execution_id,
            operation = %self.operation,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            elapsed_ms = elapsed.as_millis() as u64,
            error = ?error,
            "retry.scheduling"
        );
    }

    pub fn emit_rejected(&self, attempt: u32, error: &dyn Debug) {
        event!(
            Level::DEBUG,
            execution_id = %self.execution_id,
            operation = %self.operation,
            attempt,
            error = ?error,
            "retry.rejected"
        );
    }

    pub fn emit_outcome(&self, outcome: &RetryOutcome) {
        if outcome.success() {
            event!(
                Level::INFO,
                execution_id = %self.execution_id,
                operation = %self.operation,
                attempts = outcome.attempts,
                status = %outcome.status,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "retry.outcome"
            );
        } else {
            event!(
                Level::WARN,
                execution_id = %self.execution_id,
                operation = %self.operation,
                attempts = outcome.attempts,
                status = %outcome.status,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "retry.outcome"
            );
        }
    }
}
