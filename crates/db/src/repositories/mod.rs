//! Table-level operations over a [`RowStore`](crate::RowStore).

pub mod class_session_repo;
pub mod job_repo;
pub mod subscription_repo;

pub use class_session_repo::ClassSessionRepo;
pub use job_repo::JobRepo;
pub use subscription_repo::SubscriptionRepo;
