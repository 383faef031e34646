//! Repository implementations for database operations.

pub mod bathroom;
pub mod user;

pub use bathroom::BathroomRepository;
pub use user::UserRepository;
