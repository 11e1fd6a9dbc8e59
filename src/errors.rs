use std::fmt;
use std::time::Duration;

/// Invalid retry configuration. Raised before the first attempt is made.
#[derive(Debug)]
pub enum ConfigError {
    MaxAttempts(i64),
    DelayOrder { base: Duration, max: Duration },
    Delay { field: &'static str, value: f64 },
    Env { var: &'static str, value: String },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MaxAttempts(n) => {
                write!(f, "max_attempts must be greater than 0, got {n}")
            }
            ConfigError::DelayOrder { base, max } => write!(
                f,
                "base_delay ({base:?}) cannot be greater than max_delay ({max:?})"
            ),
            ConfigError::Delay { field, value } => write!(
                f,
                "{field} must be a finite, non-negative number of seconds, got {value}"
            ),
            ConfigError::Env { var, value } => {
                write!(f, "could not parse env var {var}='{value}'")
            }
            ConfigError::Io(err) => write!(f, "failed to read retry defaults: {err}"),
            ConfigError::Json(err) => write!(f, "invalid retry defaults file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

/// Failure of a [`with_retries`](crate::with_retries) call.
///
/// `Operation` holds the failure of the last attempt exactly as the operation
/// returned it.
#[derive(Debug)]
pub enum RetryError<E> {
    Config(ConfigError),
    Operation(E),
}

impl<E> RetryError<E> {
    pub fn into_operation(self) -> Option<E> {
        match self {
            RetryError::Operation(err) => Some(err),
            RetryError::Config(_) => None,
        }
    }

    pub fn operation(&self) -> Option<&E> {
        match self {
            RetryError::Operation(err) => Some(err),
            RetryError::Config(_) => None,
        }
    }

    pub fn config(&self) -> Option<&ConfigError> {
        match self {
            RetryError::Config(err) => Some(err),
            RetryError::Operation(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Config(err) => write!(f, "invalid retry configuration: {err}"),
            RetryError::Operation(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetryError::Config(err) => Some(err),
            RetryError::Operation(err) => err.source(),
        }
    }
}

impl<E> From<ConfigError> for RetryError<E> {
    fn from(err: ConfigError) -> Self {
        RetryError::Config(err)
    }
}
