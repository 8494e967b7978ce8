//! Shared types for the intake portal
//!
//! Domain models, the unified error system, the feedback change-feed
//! protocol, page gating and the evaluator-side review state.

pub mod error;
pub mod feed;
pub mod models;
pub mod pages;
pub mod review;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use feed::{FeedMessage, FeedbackChange};
pub use pages::{GateDecision, GateOutcome, Page};
