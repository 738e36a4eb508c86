//! Domain types for the Corner enqueue service.
//!
//! Everything here is pure: no I/O, no async. The API and database crates
//! build on these types.

pub mod class_mode;
pub mod error;
pub mod plan;
pub mod types;
