//! intake-cloud — applicant intake portal backend
//!
//! - Accounts and the role gate (developer / evaluator)
//! - Submission intake: image compression, archive check, object storage
//! - Review feed with a live feedback change feed (WebSocket)
//! - Decision recorder and applicant notification email

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod intake;
pub mod live;
pub mod review;
pub mod state;
pub mod storage;
