//! Main error type for the gateway.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use super::ErrorKind;

/// The primary error type for gateway operations.
///
/// `Error` provides enough context for a host to report a failed login:
/// - [`kind()`](Error::kind): Categorization for `match` statements
/// - [`message()`](Error::message): Human-readable cause
/// - [`source()`](StdError::source): Underlying transport or decode error
///
/// ## Example
///
/// ```rust
/// use ory_auth::{Error, ErrorKind};
///
/// fn describe(err: &Error) -> &'static str {
///     match err.kind() {
///         ErrorKind::InvalidInput => "bad request",
///         ErrorKind::SessionInvalid => "please log in again",
///         ErrorKind::UpstreamUnavailable | ErrorKind::Upstream => "backend problem",
///         _ => "login failed",
///     }
/// }
///
/// let err = Error::session_invalid("session expired");
/// assert_eq!(describe(&err), "please log in again");
/// ```
#[derive(Debug)]
pub struct Error {
    /// The error category.
    kind: ErrorKind,

    /// Human-readable error message.
    message: Cow<'static, str>,

    /// The underlying error, if any.
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ory_auth::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::InvalidInput, "namespace is required");
    /// assert_eq!(err.kind(), ErrorKind::InvalidInput);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self { kind, message: message.into(), source: None }
    }

    /// Creates an error from a kind with a default message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        let message = match kind {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::UpstreamUnavailable => "backing service unavailable",
            ErrorKind::SessionInvalid => "session could not be validated",
            ErrorKind::Upstream => "backing service call failed",
            ErrorKind::NotAuthorized => "subject does not hold the relation",
            ErrorKind::Cancelled => "login attempt cancelled",
            ErrorKind::Timeout => "login attempt timed out",
            ErrorKind::Configuration => "invalid configuration",
            ErrorKind::Storage => "storage access failed",
        };
        Self::new(kind, message)
    }

    /// Returns the error kind for categorization.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message without the kind prefix.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sets the source error for this error.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Wraps this error under a new kind, keeping the message and source.
    ///
    /// Used where a lower layer's failure must be reported under the kind
    /// the calling component owns (a cache miss that failed to dial becomes
    /// `UpstreamUnavailable` for the resolver).
    #[must_use]
    pub(crate) fn reclassify(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    // Convenience constructors for common error types

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Creates an upstream unavailable error.
    pub fn upstream_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, message)
    }

    /// Creates a session invalid error.
    pub fn session_invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::SessionInvalid, message)
    }

    /// Creates an upstream call error.
    pub fn upstream(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Upstream, message)
    }

    /// Creates a cancelled error.
    pub fn cancelled() -> Self {
        Self::from_kind(ErrorKind::Cancelled)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::configuration(format!("invalid URL: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::storage(format!("JSON error: {}", err)).with_source(err)
    }
}
