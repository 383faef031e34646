//! HTTP route handlers.

pub mod auth;
pub mod bathrooms;
pub mod favorites;
pub mod health;
pub mod recommendations;
pub mod reviews;
