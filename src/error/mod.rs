//! Error types for the gateway.
//!
//! The gateway provides two main error types:
//! - [`Error`]: Failures (invalid input, unreachable service, bad session, ...)
//! - [`AccessDenied`]: The relation check succeeded and answered "no"
//!
//! ## Key Invariant
//!
//! A login that is refused because the subject does not hold the relation is
//! a [`Denial`](crate::Denial) carrying an `AccessDenied`, not an `Error`.
//! Only [`LoginOutcome::into_result`](crate::LoginOutcome::into_result)
//! folds the two together, using [`ErrorKind::NotAuthorized`].

mod access_denied;
mod core;
mod kind;

pub use access_denied::AccessDenied;
pub use core::Error;
pub use kind::ErrorKind;

/// A specialized `Result` type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;
