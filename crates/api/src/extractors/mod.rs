//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data.

pub mod validated_query;

pub use validated_query::ValidatedQuery;
