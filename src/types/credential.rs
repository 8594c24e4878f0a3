//! Credential descriptor handed to the host after a successful login.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time-bounded grant issued for an allowed login.
///
/// Once returned, the credential belongs to the host's credential/lease
/// subsystem; the gateway keeps no reference to it.
///
/// ## Serialization
///
/// Durations are serialized as whole seconds:
///
/// ```json
/// {
///   "policies": ["files/report.pdf"],
///   "metadata": {"namespace": "files", "object": "report.pdf", "relation": "viewer", "subject": "user-1"},
///   "ttl": 3600, "max_ttl": 3600, "period": 3600,
///   "renewable": true,
///   "alias": "kratos-session",
///   "display_name": "kratos",
///   "issued_at": "2024-01-01T00:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Policies attached to the credential (`namespace/object`).
    pub policies: BTreeSet<String>,

    /// The resolved login fields: `namespace`, `object`, `relation`, `subject`.
    pub metadata: BTreeMap<String, String>,

    /// Initial lease duration.
    #[serde(with = "duration_secs")]
    pub ttl: Duration,

    /// Upper bound on the lease, renewals included.
    #[serde(with = "duration_secs")]
    pub max_ttl: Duration,

    /// Renewal period, if the lease is periodic.
    #[serde(with = "duration_secs_opt", default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Duration>,

    /// Whether the host may renew the lease.
    pub renewable: bool,

    /// Stable alias name for the authentication method.
    pub alias: String,

    /// Display name for the authentication method.
    pub display_name: String,

    /// When the credential was issued.
    pub issued_at: DateTime<Utc>,
}

impl Credential {
    /// Returns the metadata value for `key`.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Returns `true` if the credential carries `policy`.
    pub fn has_policy(&self, policy: &str) -> bool {
        self.policies.contains(policy)
    }
}

/// Serde helper for Duration as whole seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Serde helper for `Option<Duration>` as whole seconds.
pub(crate) mod duration_secs_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_secs().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<u64>::deserialize(deserializer)?;
        Ok(opt.map(Duration::from_secs))
    }
}
