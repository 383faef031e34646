//! Shared utilities and common types for the bathroom review backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Session token signing and validation
//! - Common validation logic

pub mod jwt;
pub mod validation;
