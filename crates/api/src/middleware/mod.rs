//! Request extractors.
//!
//! - [`caller::Caller`] -- best-effort caller identity and subscription tier.

pub mod caller;
