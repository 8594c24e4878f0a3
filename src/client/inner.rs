//! Internal gateway state.

use std::sync::Arc;

use super::cache::ConnectionCache;
use crate::config::CredentialPolicy;
use crate::login::LoginCoordinator;

pub(crate) struct GatewayInner {
    /// Service handles shared by every login.
    pub cache: Arc<ConnectionCache>,

    /// The login pipeline.
    pub coordinator: LoginCoordinator,

    /// Lease settings the coordinator issues credentials with.
    pub credential_policy: CredentialPolicy,
}
