//! Domain layer for the bathroom review service.
//!
//! This crate contains:
//! - Domain models (Bathroom, Review, User, listing queries)
//! - Ports implemented by the store and identity adapters
//! - Business logic services (review aggregation, queries, recommendations, favorites)
//! - Domain error types

pub mod error;
pub mod models;
pub mod ports;
pub mod services;

pub use error::DomainError;
