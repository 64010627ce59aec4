// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Error type for future-based memoized computations.

use std::{fmt, sync::Arc};

/// An error from a future-based memoized computation.
///
/// This is an opaque error that wraps whatever the wrapped computation
/// failed with. It is cheaply cloneable so that a single upstream failure
/// can fan out to every caller coalesced onto the in-flight computation.
/// Use [`source_as`](Self::source_as) or [`std::error::Error::source`] to
/// reach the underlying cause.
///
/// # Examples
///
/// ```
/// use memoir::Error;
///
/// let error = Error::from_source(std::io::Error::other("backend down"));
/// assert!(error.to_string().contains("backend down"));
/// assert!(error.source_as::<std::io::Error>().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct Error {
    message: Arc<str>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates an error carrying only a message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into().into(),
            source: None,
        }
    }

    /// Wraps an underlying error, keeping it reachable through
    /// [`std::error::Error::source`].
    #[must_use]
    pub fn from_source<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: source.to_string().into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Downcasts the underlying cause to a concrete error type.
    #[must_use]
    pub fn source_as<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.source.as_deref()?.downcast_ref()
    }

    /// Error delivered to waiters whose in-flight computation was dropped
    /// before it produced a result.
    pub(crate) fn abandoned() -> Self {
        Self::from_message("in-flight computation was dropped before completing")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

/// A specialized [`Result`](std::result::Result) for memoized computations.
pub type Result<T> = std::result::Result<T, Error>;
