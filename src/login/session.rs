//! Session token to subject resolution.

use std::sync::Arc;

use crate::client::ConnectionCache;
use crate::login::CallContext;
use crate::types::Subject;
use crate::{Error, ErrorKind};

/// Resolves a session token to the subject that owns it, through the
/// cached identity service handle.
///
/// One attempt per call. The token itself is never logged.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    cache: Arc<ConnectionCache>,
}

impl SessionResolver {
    /// Creates a resolver over `cache`.
    pub fn new(cache: Arc<ConnectionCache>) -> Self {
        Self { cache }
    }

    /// Resolves `token` to a verified subject.
    ///
    /// # Errors
    ///
    /// | Kind                  | When                                                  |
    /// |-----------------------|-------------------------------------------------------|
    /// | `InvalidInput`        | `token` is empty                                      |
    /// | `UpstreamUnavailable` | no identity handle could be created                   |
    /// | `SessionInvalid`      | the session is unknown, expired, inactive or has no identity |
    /// | `Upstream`            | the lookup call itself failed                         |
    /// | `Cancelled`/`Timeout` | from `ctx`                                            |
    pub async fn resolve(&self, token: &str, ctx: &CallContext) -> Result<Subject, Error> {
        if token.is_empty() {
            return Err(Error::invalid_input("session_token is required"));
        }

        ctx.run(async {
            let identity = self
                .cache
                .identity()
                .await
                .map_err(|e| e.reclassify(ErrorKind::UpstreamUnavailable))?;

            let lookup = identity.resolve_session(token).await.map_err(|e| match e.kind() {
                ErrorKind::InvalidInput | ErrorKind::Cancelled | ErrorKind::Timeout => e,
                _ => {
                    tracing::warn!(error = %e, "session lookup failed");
                    e.reclassify(ErrorKind::Upstream)
                },
            })?;

            if !lookup.valid {
                return Err(Error::session_invalid(format!(
                    "session is not active (identity service answered {})",
                    lookup.status
                )));
            }

            let subject_id = lookup
                .subject_id
                .ok_or_else(|| Error::session_invalid("session has no identity record"))?;
            Subject::new(subject_id)
        })
        .await
    }
}
