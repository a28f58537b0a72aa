//! Shared utilities and common types for the Shopdesk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT verification for admin callers
//! - Date parameter parsing and validation helpers

pub mod jwt;
pub mod validation;
