//! The login decision protocol.
//!
//! - [`LoginCoordinator`]: Runs the pipeline and produces a [`LoginOutcome`]
//! - [`SessionResolver`]: Session token to [`Subject`](crate::Subject)
//! - [`RelationChecker`]: Relation check against the authorization service
//! - [`CredentialIssuer`]: Credential for an allowed login
//! - [`CallContext`]: Cancellation and deadline for one attempt

mod context;
mod coordinator;
mod issuer;
mod relation;
mod session;

pub use context::CallContext;
pub use coordinator::{Denial, DenyReason, LoginCoordinator, LoginOutcome, LoginState};
pub use issuer::CredentialIssuer;
pub use relation::RelationChecker;
pub use session::SessionResolver;
