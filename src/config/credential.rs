//! Lease policy for issued credentials.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::types::{duration_secs, duration_secs_opt};

/// Default renewal window for issued credentials.
pub const DEFAULT_RENEWAL_WINDOW: Duration = Duration::from_secs(60 * 60);

/// How credentials issued on a granted login are leased.
///
/// ## Example
///
/// ```rust
/// use ory_auth::CredentialPolicy;
/// use std::time::Duration;
///
/// // Default: one-hour renewable lease
/// let policy = CredentialPolicy::default();
/// assert_eq!(policy.ttl, Duration::from_secs(3600));
///
/// // Shorter window
/// let policy = CredentialPolicy::with_window(Duration::from_secs(900));
/// assert_eq!(policy.max_ttl, Duration::from_secs(900));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct CredentialPolicy {
    /// Initial lease duration.
    #[builder(default = DEFAULT_RENEWAL_WINDOW)]
    #[serde(with = "duration_secs")]
    pub ttl: Duration,

    /// Upper bound on the lease.
    #[builder(default = DEFAULT_RENEWAL_WINDOW)]
    #[serde(with = "duration_secs")]
    pub max_ttl: Duration,

    /// Renewal period.
    #[serde(with = "duration_secs_opt", default)]
    pub period: Option<Duration>,

    /// Whether issued credentials are renewable.
    #[builder(default = true)]
    pub renewable: bool,

    /// Alias name recorded for the authentication method.
    #[builder(into, default = String::from("kratos-session"))]
    pub alias: String,

    /// Display name recorded for the authentication method.
    #[builder(into, default = String::from("kratos"))]
    pub display_name: String,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self::with_window(DEFAULT_RENEWAL_WINDOW)
    }
}

impl CredentialPolicy {
    /// Creates a renewable policy where ttl, max ttl and period all equal
    /// `window`.
    pub fn with_window(window: Duration) -> Self {
        Self::builder().ttl(window).max_ttl(window).period(window).build()
    }

    /// Validates the lease bounds.
    pub fn validate(&self) -> Result<(), Error> {
        if self.ttl.is_zero() {
            return Err(Error::configuration("credential ttl must be positive"));
        }
        if self.max_ttl < self.ttl {
            return Err(Error::configuration("credential max_ttl must not be shorter than ttl"));
        }
        if self.alias.is_empty() {
            return Err(Error::configuration("credential alias must not be empty"));
        }
        Ok(())
    }
}
