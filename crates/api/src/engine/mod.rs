//! Request orchestration.
//!
//! - [`enqueue`] -- job + class-session write with compensating delete.

pub mod enqueue;

pub use enqueue::{enqueue, spawn_enqueue, EnqueueError, EnqueueRequest, Enqueued, Rollback};
