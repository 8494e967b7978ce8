//! Accounts, session tokens and the role gate

pub mod gate;
pub mod password;
pub mod session;

pub use gate::{authorize, require_developer, require_evaluator};
pub use session::Session;
