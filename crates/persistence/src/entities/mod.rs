//! Database entity definitions.
//!
//! Entities are direct mappings to query result rows.

pub mod analytics;

pub use analytics::{
    non_negative, DailySalesBucketRow, DailySalesRow, OrderTotalsRow, ProductBucketRow,
    ProductRankRow, RoleCountRow, SignupRow,
};
