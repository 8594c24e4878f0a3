//! Relation checks against the authorization service.

use std::sync::Arc;

use crate::client::ConnectionCache;
use crate::login::CallContext;
use crate::types::RelationQuery;
use crate::{Error, ErrorKind};

/// Asks the authorization service whether a subject holds a relation.
///
/// Answers are returned verbatim and never cached.
#[derive(Debug, Clone)]
pub struct RelationChecker {
    cache: Arc<ConnectionCache>,
}

impl RelationChecker {
    /// Creates a checker over `cache`.
    pub fn new(cache: Arc<ConnectionCache>) -> Self {
        Self { cache }
    }

    /// Returns whether `subject` holds `relation` on `object` in `namespace`.
    pub async fn check(
        &self,
        namespace: &str,
        object: &str,
        relation: &str,
        subject: &str,
        ctx: &CallContext,
    ) -> Result<bool, Error> {
        self.check_query(&RelationQuery::new(namespace, object, relation, subject), ctx).await
    }

    /// Checks a prepared query.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if any field of `query` is empty
    /// - `UpstreamUnavailable` if no authorization handle could be created
    /// - `Upstream` if the check call failed
    /// - `Cancelled` or `Timeout` from `ctx`
    pub async fn check_query(
        &self,
        query: &RelationQuery,
        ctx: &CallContext,
    ) -> Result<bool, Error> {
        if let Some(field) = query.first_empty_field() {
            return Err(Error::invalid_input(format!("{} is required", field)));
        }

        ctx.run(async {
            let authorization = self
                .cache
                .authorization()
                .await
                .map_err(|e| e.reclassify(ErrorKind::UpstreamUnavailable))?;

            let result = authorization.check(query).await.map_err(|e| match e.kind() {
                ErrorKind::Cancelled | ErrorKind::Timeout => e,
                _ => {
                    tracing::warn!(error = %e, "relation check failed");
                    e.reclassify(ErrorKind::Upstream)
                },
            })?;

            tracing::debug!(query = %query, allowed = result.allowed, "relation checked");
            Ok(result.allowed)
        })
        .await
    }
}
