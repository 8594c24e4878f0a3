//! AccessDenied type for a relation that is not held.

use std::error::Error as StdError;
use std::fmt;

use crate::types::RelationQuery;

/// Returned when the relation check answered "not allowed".
///
/// This type is **distinct from gateway errors** ([`Error`](crate::Error)). It
/// represents a relation check that succeeded and came back negative, not a
/// failure to check. Hosts should log it as a deny rather than a fault.
///
/// ## Key Invariant
///
/// | Outcome                             | Type                          |
/// |-------------------------------------|-------------------------------|
/// | Keto answered `allowed = false`     | `AccessDenied`                |
/// | Keto could not be reached           | `ErrorKind::UpstreamUnavailable` |
/// | Keto call failed mid-flight         | `ErrorKind::Upstream`         |
///
/// ## Example
///
/// ```rust
/// use ory_auth::{AccessDenied, RelationQuery};
///
/// let query = RelationQuery::new("files", "report.pdf", "viewer", "user-1");
/// let denied = AccessDenied::new(query);
/// assert_eq!(denied.query().subject(), "user-1");
/// assert!(denied.to_string().contains("does not hold"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    /// The relation that was checked.
    query: RelationQuery,
}

impl AccessDenied {
    /// Creates a denial for the given query.
    pub fn new(query: RelationQuery) -> Self {
        Self { query }
    }

    /// Returns the relation query that was denied.
    #[inline]
    pub fn query(&self) -> &RelationQuery {
        &self.query
    }

    /// Returns a formatted string suitable for logging.
    pub fn to_log_string(&self) -> String {
        format!(
            "access_denied: namespace={} object={} relation={} subject={}",
            self.query.namespace(),
            self.query.object(),
            self.query.relation(),
            self.query.subject()
        )
    }
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subject {} does not hold relation {} to object {} in namespace {}",
            self.query.subject(),
            self.query.relation(),
            self.query.object(),
            self.query.namespace()
        )
    }
}

impl StdError for AccessDenied {}

/// Converts a denial into the main error type with kind `NotAuthorized`.
impl From<AccessDenied> for super::Error {
    fn from(denied: AccessDenied) -> Self {
        super::Error::new(super::ErrorKind::NotAuthorized, denied.to_string())
    }
}
