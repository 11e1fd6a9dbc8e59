//! Classification of operation failures into retryable and terminal.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

type Matcher<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Set of failure kinds that trigger another attempt.
///
/// A kind is a predicate over the operation's error type. The default set
/// matches every error.
pub struct Rescue<E> {
    // `None` rescues everything.
    matchers: Option<Vec<Matcher<E>>>,
}

impl<E> Rescue<E> {
    pub fn any() -> Self {
        Self { matchers: None }
    }

    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            matchers: Some(vec![Arc::new(predicate)]),
        }
    }

    /// Also rescue errors matching `predicate`.
    pub fn or_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        if let Some(matchers) = self.matchers.as_mut() {
            matchers.push(Arc::new(predicate));
        }
        self
    }

    pub fn is_any(&self) -> bool {
        self.matchers.is_none()
    }

    pub fn matches(&self, err: &E) -> bool {
        match &self.matchers {
            None => true,
            Some(matchers) => matchers.iter().any(|matches| matches(err)),
        }
    }
}

impl<E: AsDynError + 'static> Rescue<E> {
    /// Rescue errors of concrete type `K`, either directly or anywhere in the
    /// `source()` chain.
    pub fn kind<K: Error + 'static>() -> Self {
        Self::when(|err: &E| has_kind::<K>(err.as_dyn_error()))
    }

    pub fn or_kind<K: Error + 'static>(self) -> Self {
        self.or_when(|err: &E| has_kind::<K>(err.as_dyn_error()))
    }
}

impl<E> Default for Rescue<E> {
    fn default() -> Self {
        Self::any()
    }
}

impl<E> Clone for Rescue<E> {
    fn clone(&self) -> Self {
        Self {
            matchers: self.matchers.clone(),
        }
    }
}

impl<E> fmt::Debug for Rescue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.matchers {
            None => f.write_str("Rescue::Any"),
            Some(matchers) => write!(f, "Rescue::Kinds({})", matchers.len()),
        }
    }
}

/// Errors that can be inspected as `dyn Error` for [`Rescue::kind`].
pub trait AsDynError {
    fn as_dyn_error(&self) -> &(dyn Error + 'static);
}

impl AsDynError for Box<dyn Error + Send + Sync + 'static> {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        &**self
    }
}

impl AsDynError for Box<dyn Error + 'static> {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        &**self
    }
}

impl AsDynError for std::io::Error {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        self
    }
}

fn has_kind<K: Error + 'static>(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<K>() {
            return true;
        }
        // io::Error::source() skips the wrapped error and returns its source.
        current = match err
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::get_ref)
        {
            Some(inner) => Some(inner as &(dyn Error + 'static)),
            None => err.source(),
        };
    }
    false
}
