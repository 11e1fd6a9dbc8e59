//! Process-wide retry defaults.
//!
//! Per-call [`RetryOptions`](crate::retry::RetryOptions) fall back to these
//! values field by field. Each execution reads them once, when its options are
//! resolved, so changes made while a retry loop is running only affect later
//! executions.

use std::sync::{OnceLock, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryDefaults {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryDefaults {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// Values an execution resolved its options against.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DefaultsSnapshot {
    pub defaults: RetryDefaults,
    pub sleep_enabled: bool,
}

impl Default for DefaultsSnapshot {
    fn default() -> Self {
        Self {
            defaults: RetryDefaults::default(),
            sleep_enabled: true,
        }
    }
}

// The defaults and the sleep switch share one lock so a snapshot never pairs
// values from two different writes.
fn store() -> &'static RwLock<DefaultsSnapshot> {
    static STATE: OnceLock<RwLock<DefaultsSnapshot>> = OnceLock::new();
    STATE.get_or_init(|| RwLock::new(DefaultsSnapshot::default()))
}

fn write() -> RwLockWriteGuard<'static, DefaultsSnapshot> {
    store().write().unwrap_or_else(PoisonError::into_inner)
}

pub fn defaults() -> RetryDefaults {
    snapshot().defaults
}

/// Replace the process-wide defaults. Values are validated by the executions
/// that use them, not here.
pub fn set_defaults(defaults: RetryDefaults) {
    write().defaults = defaults;
}

pub fn update_defaults(f: impl FnOnce(&mut RetryDefaults)) {
    f(&mut write().defaults);
}

/// Restore the built-in defaults and re-enable sleeping.
pub fn reset_defaults() {
    *write() = DefaultsSnapshot::default();
}

pub fn sleep_enabled() -> bool {
    snapshot().sleep_enabled
}

/// Turn backoff waits on or off for every execution that does not override
/// it. Mostly useful in test suites.
pub fn set_sleep_enabled(enabled: bool) {
    write().sleep_enabled = enabled;
}

pub(crate) fn snapshot() -> DefaultsSnapshot {
    *store().read().unwrap_or_else(PoisonError::into_inner)
}

/// Compute the next state from the current one and install it, all under a
/// single write lock. On error the state is left as it was.
pub(crate) fn try_replace<E>(
    f: impl FnOnce(DefaultsSnapshot) -> Result<DefaultsSnapshot, E>,
) -> Result<DefaultsSnapshot, E> {
    let mut guard = write();
    let next = f(*guard)?;
    *guard = next;
    Ok(next)
}
