//! Credential synthesis for allowed logins.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;

use crate::config::CredentialPolicy;
use crate::types::{Credential, RelationQuery};

/// Turns an allowed relation query into a leased [`Credential`].
#[derive(Debug, Clone, Default)]
pub struct CredentialIssuer {
    policy: CredentialPolicy,
}

impl CredentialIssuer {
    /// Creates an issuer using `policy` for lease settings.
    pub fn new(policy: CredentialPolicy) -> Self {
        Self { policy }
    }

    /// The lease policy in effect.
    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    /// Issues the credential for an allowed `query`.
    ///
    /// The credential carries the single policy `namespace/object` and the
    /// four resolved fields as metadata.
    pub fn issue(&self, query: &RelationQuery) -> Credential {
        let metadata = BTreeMap::from([
            ("namespace".to_string(), query.namespace().to_string()),
            ("object".to_string(), query.object().to_string()),
            ("relation".to_string(), query.relation().to_string()),
            ("subject".to_string(), query.subject().to_string()),
        ]);

        Credential {
            policies: BTreeSet::from([query.policy()]),
            metadata,
            ttl: self.policy.ttl,
            max_ttl: self.policy.max_ttl,
            period: self.policy.period,
            renewable: self.policy.renewable,
            alias: self.policy.alias.clone(),
            display_name: self.policy.display_name.clone(),
            issued_at: Utc::now(),
        }
    }
}
