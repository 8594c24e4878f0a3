//! The login decision pipeline.
//!
//! ```text
//! Start ─▶ FieldsValidated ─▶ SessionResolved ─▶ RelationChecked ─▶ Granted
//!   │             │                  │                  │
//!   └─────────────┴──────────────────┴──────────────────┴──────▶ Denied
//! ```
//!
//! Every stage runs once. Any failure stops the pipeline and is reported
//! as a [`Denial`] recording the last state reached.

use std::fmt;

use serde::Serialize;

use crate::error::AccessDenied;
use crate::login::{CallContext, CredentialIssuer, RelationChecker, SessionResolver};
use crate::types::{Credential, LoginRequest, RelationQuery};
use crate::{Error, ErrorKind};

// ============================================================================
// States and Outcomes
// ============================================================================

/// Position of a login attempt in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    /// Nothing checked yet.
    Start,
    /// All four fields are present.
    FieldsValidated,
    /// The session resolved to a subject.
    SessionResolved,
    /// The authorization service answered.
    RelationChecked,
    /// A credential was issued.
    Granted,
    /// The attempt was refused.
    Denied,
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginState::Start => "start",
            LoginState::FieldsValidated => "fields_validated",
            LoginState::SessionResolved => "session_resolved",
            LoginState::RelationChecked => "relation_checked",
            LoginState::Granted => "granted",
            LoginState::Denied => "denied",
        };
        f.write_str(name)
    }
}

/// Why a login was refused.
#[derive(Debug)]
pub enum DenyReason {
    /// The check succeeded and the subject does not hold the relation.
    NotAuthorized(AccessDenied),
    /// A stage failed.
    Failed(Error),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NotAuthorized(denied) => write!(f, "relation not held: {}", denied),
            DenyReason::Failed(error) => write!(f, "{}", error),
        }
    }
}

/// A refused login: where it stopped and why.
#[derive(Debug)]
pub struct Denial {
    stage: LoginState,
    reason: DenyReason,
}

impl Denial {
    fn failed(stage: LoginState, error: Error) -> Self {
        Self { stage, reason: DenyReason::Failed(error) }
    }

    /// The last state the attempt reached before being refused.
    pub fn stage(&self) -> LoginState {
        self.stage
    }

    /// The cause.
    pub fn reason(&self) -> &DenyReason {
        &self.reason
    }

    /// The error kind a host should report; `NotAuthorized` for a negative
    /// relation check.
    pub fn kind(&self) -> ErrorKind {
        match &self.reason {
            DenyReason::NotAuthorized(_) => ErrorKind::NotAuthorized,
            DenyReason::Failed(error) => error.kind(),
        }
    }

    /// Returns `true` if the relation check answered "no".
    pub fn is_not_authorized(&self) -> bool {
        matches!(self.reason, DenyReason::NotAuthorized(_))
    }

    /// Converts into the gateway error type.
    pub fn into_error(self) -> Error {
        match self.reason {
            DenyReason::NotAuthorized(denied) => denied.into(),
            DenyReason::Failed(error) => error,
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reason.fmt(f)
    }
}

/// Result of one login attempt.
#[derive(Debug)]
pub enum LoginOutcome {
    /// The subject holds the relation; the credential is the host's.
    Granted(Credential),
    /// The attempt was refused.
    Denied(Denial),
}

impl LoginOutcome {
    /// Returns `true` for [`LoginOutcome::Granted`].
    pub fn is_granted(&self) -> bool {
        matches!(self, LoginOutcome::Granted(_))
    }

    /// The issued credential, if granted.
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            LoginOutcome::Granted(credential) => Some(credential),
            LoginOutcome::Denied(_) => None,
        }
    }

    /// The denial, if refused.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            LoginOutcome::Granted(_) => None,
            LoginOutcome::Denied(denial) => Some(denial),
        }
    }

    /// The message a host returns to the caller on deny; `None` if granted.
    pub fn error_message(&self) -> Option<String> {
        self.denial().map(ToString::to_string)
    }

    /// Folds the outcome into a `Result`, mapping a negative relation
    /// check to [`ErrorKind::NotAuthorized`].
    pub fn into_result(self) -> Result<Credential, Error> {
        match self {
            LoginOutcome::Granted(credential) => Ok(credential),
            LoginOutcome::Denied(denial) => Err(denial.into_error()),
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Drives one login attempt through validation, session resolution, the
/// relation check and credential issuance.
#[derive(Debug, Clone)]
pub struct LoginCoordinator {
    resolver: SessionResolver,
    checker: RelationChecker,
    issuer: CredentialIssuer,
}

impl LoginCoordinator {
    /// Creates a coordinator from its three collaborators.
    pub fn new(
        resolver: SessionResolver,
        checker: RelationChecker,
        issuer: CredentialIssuer,
    ) -> Self {
        Self { resolver, checker, issuer }
    }

    /// Runs the pipeline for `request`.
    ///
    /// Never panics and never returns early without an outcome: every
    /// failure becomes [`LoginOutcome::Denied`].
    pub async fn login(&self, request: &LoginRequest, ctx: &CallContext) -> LoginOutcome {
        let mut state = LoginState::Start;

        if let Err(e) = request.validate() {
            tracing::debug!(error = %e, "login rejected: missing field");
            return LoginOutcome::Denied(Denial::failed(state, e));
        }
        state = self.advance(state, LoginState::FieldsValidated);

        let subject = match self.resolver.resolve(&request.session_token, ctx).await {
            Ok(subject) => subject,
            Err(e) => return self.deny(state, e),
        };
        state = self.advance(state, LoginState::SessionResolved);

        let query = RelationQuery::new(
            request.namespace.as_str(),
            request.object.as_str(),
            request.relation.as_str(),
            subject.into_inner(),
        );
        let allowed = match self.checker.check_query(&query, ctx).await {
            Ok(allowed) => allowed,
            Err(e) => return self.deny(state, e),
        };
        state = self.advance(state, LoginState::RelationChecked);

        if !allowed {
            let denied = AccessDenied::new(query);
            tracing::info!(denial = %denied.to_log_string(), "login denied");
            return LoginOutcome::Denied(Denial {
                stage: state,
                reason: DenyReason::NotAuthorized(denied),
            });
        }

        let credential = self.issuer.issue(&query);
        self.advance(state, LoginState::Granted);
        tracing::info!(
            namespace = query.namespace(),
            object = query.object(),
            relation = query.relation(),
            subject = query.subject(),
            "login granted"
        );
        LoginOutcome::Granted(credential)
    }

    fn advance(&self, from: LoginState, to: LoginState) -> LoginState {
        tracing::debug!(%from, %to, "login state transition");
        to
    }

    fn deny(&self, stage: LoginState, error: Error) -> LoginOutcome {
        match error.kind() {
            ErrorKind::UpstreamUnavailable | ErrorKind::Upstream | ErrorKind::Storage => {
                tracing::warn!(%stage, error = %error, "login failed");
            },
            _ => tracing::debug!(%stage, error = %error, "login denied"),
        }
        LoginOutcome::Denied(Denial::failed(stage, error))
    }
}
