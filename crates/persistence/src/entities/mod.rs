//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod bathroom;
pub mod user;

pub use bathroom::{BathroomEntity, BATHROOM_COLUMNS};
pub use user::UserEntity;
