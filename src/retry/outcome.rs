use std::fmt;
use std::time::Duration;

/// Terminal state of one execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeStatus {
    Succeeded,
    Exhausted,
    NotRetryable,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Succeeded => write!(f, "succeeded"),
            OutcomeStatus::Exhausted => write!(f, "exhausted"),
            OutcomeStatus::NotRetryable => write!(f, "not_retryable"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RetryOutcome {
    pub attempts: u32,
    pub status: OutcomeStatus,
    pub elapsed: Duration,
}

impl RetryOutcome {
    pub fn success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }
}
