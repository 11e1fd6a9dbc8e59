//! Run fallible operations with bounded retries, exponential backoff and jitter.
//!
//! ```no_run
//! use std::time::Duration;
//! use retries::{Rescue, RetryOptions, with_retries};
//!
//! let body = with_retries(
//!     RetryOptions::new()
//!         .max_attempts(5)
//!         .base_delay(Duration::from_millis(100))
//!         .max_delay(Duration::from_secs(2))
//!         .rescue(Rescue::when(|err: &std::io::Error| {
//!             err.kind() == std::io::ErrorKind::TimedOut
//!         })),
//!     |_attempt| std::fs::read_to_string("/var/run/service.pid"),
//! );
//! ```

pub mod clock;
pub mod config;
pub mod defaults;
pub mod errors;
pub mod jitter;
pub mod retry;
mod telemetry;

pub use config::{DefaultsConfig, DefaultsSource, load_defaults, read_defaults};
pub use defaults::{RetryDefaults, set_sleep_enabled, sleep_enabled};
pub use errors::{ConfigError, RetryError};
pub use retry::{Rescue, RetryExecutor, RetryOptions, RetryPlan, with_retries, with_retries_async};
