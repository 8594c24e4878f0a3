//! Configuration types for the gateway.
//!
//! This module provides:
//! - [`GatewayConfig`]: Persisted settings for the identity and authorization services
//! - [`CredentialPolicy`]: Lease settings for issued credentials
//! - [`Storage`]: The host's key/value storage, and [`InMemoryStorage`]

mod credential;
mod gateway;
mod store;

pub use credential::{CredentialPolicy, DEFAULT_RENEWAL_WINDOW};
pub use gateway::{
    AuthorizationConfig, DEFAULT_AUTHORIZATION_ENDPOINT, DEFAULT_IDENTITY_URL, GatewayConfig,
    IdentityConfig, SessionTokenKind,
};
pub use store::{CONFIG_KEY, InMemoryStorage, Storage, load_config, save_config};
