//! Error kind enumeration for categorizing gateway errors.

/// Categorization of gateway errors.
///
/// This enum provides a stable interface for matching on error types. Every
/// login failure maps onto exactly one kind, so a host can tell a caller
/// mistake from a misconfigured backend from a legitimate denial.
///
/// ## Kinds
///
/// | ErrorKind             | Raised by                     | Caller action                   |
/// |-----------------------|-------------------------------|---------------------------------|
/// | `InvalidInput`        | field validation              | Fix the request                 |
/// | `UpstreamUnavailable` | connection cache              | Check service configuration     |
/// | `SessionInvalid`      | session resolver              | Log in again                    |
/// | `Upstream`            | identity / relation calls     | Inspect the backing service     |
/// | `NotAuthorized`       | `LoginOutcome::into_result`   | None, this is a legitimate deny |
/// | `Cancelled`           | caller cancellation           | None                            |
/// | `Timeout`             | caller deadline               | Retry with a longer deadline    |
/// | `Configuration`       | configuration validation      | Fix the configuration           |
/// | `Storage`             | host storage access           | Inspect the host storage        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A required login field was missing or empty.
    ///
    /// HTTP: 400 Bad Request
    #[error("invalid input")]
    InvalidInput,

    /// A client handle for a backing service could not be obtained.
    ///
    /// Typically a dial failure or an unreadable configuration on a cache
    /// miss.
    ///
    /// HTTP: 503 Service Unavailable
    #[error("upstream unavailable")]
    UpstreamUnavailable,

    /// The session token does not resolve to a live identity.
    ///
    /// This is an authentication failure, not a server error.
    ///
    /// HTTP: 401 Unauthorized
    #[error("session invalid")]
    SessionInvalid,

    /// A backing service call failed for transport or protocol reasons.
    ///
    /// HTTP: 502 Bad Gateway
    #[error("upstream error")]
    Upstream,

    /// The subject does not hold the requested relation.
    ///
    /// Login itself reports this as a [`Denial`](crate::Denial) rather than
    /// an error; this kind only appears after converting an outcome with
    /// [`LoginOutcome::into_result`](crate::LoginOutcome::into_result).
    ///
    /// HTTP: 403 Forbidden
    #[error("not authorized")]
    NotAuthorized,

    /// The caller cancelled the attempt.
    ///
    /// HTTP: 499 Client Closed Request
    #[error("cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the attempt finished.
    ///
    /// HTTP: 504 Gateway Timeout
    #[error("timeout")]
    Timeout,

    /// A configuration value is invalid (malformed URL, zero TTL).
    ///
    /// HTTP: 400 Bad Request
    #[error("configuration error")]
    Configuration,

    /// The host storage could not be read, written or decoded.
    ///
    /// HTTP: 500 Internal Server Error
    #[error("storage error")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if this kind reflects a problem with the caller's
    /// request rather than with the gateway or its backing services.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ory_auth::ErrorKind;
    ///
    /// assert!(ErrorKind::SessionInvalid.is_client_error());
    /// assert!(!ErrorKind::UpstreamUnavailable.is_client_error());
    /// ```
    #[inline]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidInput
                | ErrorKind::SessionInvalid
                | ErrorKind::NotAuthorized
                | ErrorKind::Cancelled
        )
    }

    /// Returns the default HTTP status code for this error kind.
    ///
    /// Hosts use this to turn a failed login into their own transport-level
    /// response.
    #[inline]
    pub fn http_status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::Configuration => 400,
            ErrorKind::SessionInvalid => 401,
            ErrorKind::NotAuthorized => 403,
            ErrorKind::Cancelled => 499, // Client Closed Request
            ErrorKind::Storage => 500,
            ErrorKind::Upstream => 502,
            ErrorKind::UpstreamUnavailable => 503,
            ErrorKind::Timeout => 504,
        }
    }
}
