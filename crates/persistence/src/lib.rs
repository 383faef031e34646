//! Persistence layer for the bathroom review service.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - PostgreSQL repositories implementing the domain ports
//! - An in-memory store implementing the same ports

pub mod db;
pub mod entities;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod repositories;

pub use memory::InMemoryStore;
pub use repositories::{BathroomRepository, UserRepository};
