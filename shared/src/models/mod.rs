//! Data models
//!
//! Shared between intake-cloud and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUIDs.

pub mod feedback;
pub mod role;
pub mod submission;
pub mod user;

// Re-exports
pub use feedback::*;
pub use role::*;
pub use submission::*;
pub use user::*;
