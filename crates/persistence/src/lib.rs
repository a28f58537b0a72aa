//! Persistence layer for the Shopdesk analytics backend.
//!
//! This crate contains:
//! - Database connection management and embedded migrations
//! - Row mappings for aggregation queries
//! - The Postgres `AnalyticsStore` implementation

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
