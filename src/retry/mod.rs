mod executor;
mod options;
mod outcome;
mod plan;
mod rescue;

use std::fmt::Debug;
use std::future::Future;

use crate::errors::RetryError;

pub use executor::RetryExecutor;
pub use options::{OnRetry, RetryOptions};
pub(crate) use outcome::{OutcomeStatus, RetryOutcome};
pub use plan::RetryPlan;
pub use rescue::{AsDynError, Rescue};

/// Resolve `options` against the process-wide defaults and run `op` with retries.
///
/// Invalid configuration is reported as [`RetryError::Config`] before `op` is
/// ever called. Otherwise the result of the last attempt is returned, its
/// error wrapped in [`RetryError::Operation`] unchanged.
pub fn with_retries<T, E, F>(options: RetryOptions<E>, op: F) -> Result<T, RetryError<E>>
where
    E: Debug,
    F: FnMut(u32) -> Result<T, E>,
{
    let executor = options.build()?;
    executor.execute(op).map_err(RetryError::Operation)
}

pub async fn with_retries_async<T, E, F, Fut>(
    options: RetryOptions<E>,
    op: F,
) -> Result<T, RetryError<E>>
where
    E: Debug,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let executor = options.build()?;
    executor.execute_async(op).await.map_err(RetryError::Operation)
}
