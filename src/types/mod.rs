//! Core types for the gateway.
//!
//! - [`LoginRequest`]: The four login fields as received from the host
//! - [`Subject`]: A verified subject identifier
//! - [`RelationQuery`]: A fully-populated relation check
//! - [`Credential`]: The grant issued for an allowed login

mod credential;
mod query;
mod request;

pub use credential::Credential;
pub(crate) use credential::{duration_secs, duration_secs_opt};
pub use query::{RelationQuery, Subject};
pub use request::{LOGIN_FIELDS, LoginRequest};
