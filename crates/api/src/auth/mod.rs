//! Caller identity primitives.
//!
//! - [`verifier`] -- [`IdentityVerifier`](verifier::IdentityVerifier) and its
//!   remote (identity service) and local (JWT secret) implementations.
//! - [`service_key`] -- display-only inspection of the service credential.

pub mod service_key;
pub mod verifier;
