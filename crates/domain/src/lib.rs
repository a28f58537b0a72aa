//! Domain layer for the Shopdesk analytics backend.
//!
//! This crate contains:
//! - Source records (User, Product, Order) and report payloads
//! - Range resolution and the `AnalyticsStore` capability
//! - The `ReportEngine` and an in-memory store

pub mod models;
pub mod services;
