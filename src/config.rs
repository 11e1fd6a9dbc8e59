//! read process-wide retry defaults from a file or the environment

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::defaults::{self, DefaultsSnapshot, RetryDefaults};
use crate::errors::ConfigError;

pub const ENV_MAX_ATTEMPTS: &str = "RETRIES_MAX_ATTEMPTS";
pub const ENV_BASE_DELAY_SECS: &str = "RETRIES_BASE_DELAY_SECS";
pub const ENV_MAX_DELAY_SECS: &str = "RETRIES_MAX_DELAY_SECS";
pub const ENV_SLEEP_ENABLED: &str = "RETRIES_SLEEP_ENABLED";

pub enum DefaultsSource {
    File(PathBuf),
    Env,
}

/// Partial defaults. Fields left as `None` keep their current process-wide value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    pub max_attempts: Option<i64>,
    pub base_delay_secs: Option<f64>,
    pub max_delay_secs: Option<f64>,
    pub sleep_enabled: Option<bool>,
}

impl DefaultsConfig {
    /// Parse the `RETRIES_*` variables through `lookup`. Unset variables are skipped.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        Ok(Self {
            max_attempts: parse_var(&lookup, ENV_MAX_ATTEMPTS)?,
            base_delay_secs: parse_var(&lookup, ENV_BASE_DELAY_SECS)?,
            max_delay_secs: parse_var(&lookup, ENV_MAX_DELAY_SECS)?,
            sleep_enabled: parse_var(&lookup, ENV_SLEEP_ENABLED)?,
        })
    }

    /// Merge onto `current` without touching any global state.
    pub fn merge(&self, current: RetryDefaults) -> Result<RetryDefaults, ConfigError> {
        let max_attempts = match self.max_attempts {
            Some(n) if n <= 0 || n > i64::from(u32::MAX) => {
                return Err(ConfigError::MaxAttempts(n));
            }
            Some(n) => n as u32,
            None => current.max_attempts,
        };
        let base_delay = match self.base_delay_secs {
            Some(secs) => secs_to_duration("base_delay_secs", secs)?,
            None => current.base_delay,
        };
        let max_delay = match self.max_delay_secs {
            Some(secs) => secs_to_duration("max_delay_secs", secs)?,
            None => current.max_delay,
        };
        if base_delay > max_delay {
            return Err(ConfigError::DelayOrder {
                base: base_delay,
                max: max_delay,
            });
        }
        Ok(RetryDefaults {
            max_attempts,
            base_delay,
            max_delay,
        })
    }

    /// Validate and install as the process-wide defaults. Nothing changes on error.
    pub fn apply(&self) -> Result<RetryDefaults, ConfigError> {
        let installed = defaults::try_replace(|current| {
            Ok::<_, ConfigError>(DefaultsSnapshot {
                defaults: self.merge(current.defaults)?,
                sleep_enabled: self.sleep_enabled.unwrap_or(current.sleep_enabled),
            })
        })?;
        info!(
            max_attempts = installed.defaults.max_attempts,
            base_delay_ms = installed.defaults.base_delay.as_millis() as u64,
            max_delay_ms = installed.defaults.max_delay.as_millis() as u64,
            sleep_enabled = installed.sleep_enabled,
            "retry.defaults.applied"
        );
        Ok(installed.defaults)
    }
}

pub fn read_defaults(source: DefaultsSource) -> Result<DefaultsConfig, ConfigError> {
    let config = match source {
        DefaultsSource::File(path) => {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        }
        DefaultsSource::Env => DefaultsConfig::from_lookup(|var| std::env::var(var).ok())?,
    };
    Ok(config)
}

/// Read `source` and install it as the process-wide defaults.
pub fn load_defaults(source: DefaultsSource) -> Result<RetryDefaults, ConfigError> {
    read_defaults(source)?.apply()
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { var, value }),
    }
}

fn secs_to_duration(field: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::Delay { field, value: secs })
}
