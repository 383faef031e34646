//! Custom Axum extractors.

pub mod json;
pub mod session;

pub use json::json_or_default;
pub use session::{CurrentUser, OptionalCurrentUser};
