//! Query capability the report engine needs from the data store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    CategoryBucket, DailySalesBucket, DateRange, OrderAggregate, ProductRankEntry, RoleCount,
    SignupPoint, StatusBucket, TimeSeriesPoint,
};

/// Error raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unexpected value in column {column}: {value}")]
    Decode { column: String, value: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Creation-time bounds applied to records. Both ends are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// No time restriction.
    pub fn all() -> Self {
        Self::default()
    }

    /// Everything created at or before `end`.
    pub fn through(end: DateTime<Utc>) -> Self {
        Self {
            from: None,
            to: Some(end),
        }
    }

    /// Everything created inside the range.
    pub fn within(range: &DateRange) -> Self {
        Self {
            from: Some(range.start),
            to: Some(range.end),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

/// Which orders an order query covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub window: TimeWindow,
    pub exclude_cancelled: bool,
}

impl OrderFilter {
    /// Non-cancelled orders inside `window`.
    pub fn settled(window: TimeWindow) -> Self {
        Self {
            window,
            exclude_cancelled: true,
        }
    }

    /// Every order ever placed, whatever its status.
    pub fn all() -> Self {
        Self::default()
    }
}

/// Aggregation queries over orders, users and products.
///
/// Implementations must return day buckets in ascending date order, and
/// product rankings sorted by units sold descending with ties kept in the
/// order the products were first seen.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Number of users created inside `window`.
    async fn count_users(&self, window: TimeWindow) -> Result<u64, StoreError>;

    /// Number of products created inside `window`.
    async fn count_products(&self, window: TimeWindow) -> Result<u64, StoreError>;

    /// Count, revenue and mean order value.
    async fn order_aggregate(&self, filter: OrderFilter) -> Result<OrderAggregate, StoreError>;

    /// Revenue and order count per calendar day.
    async fn daily_sales(&self, filter: OrderFilter) -> Result<Vec<TimeSeriesPoint>, StoreError>;

    /// Orders, revenue and line count per calendar day.
    async fn daily_sales_buckets(
        &self,
        filter: OrderFilter,
    ) -> Result<Vec<DailySalesBucket>, StoreError>;

    /// Best-selling products by units sold, at most `limit` entries.
    async fn top_products(
        &self,
        filter: OrderFilter,
        limit: usize,
    ) -> Result<Vec<ProductRankEntry>, StoreError>;

    /// Signups per calendar day; days without signups are omitted.
    async fn daily_signups(&self, window: TimeWindow) -> Result<Vec<SignupPoint>, StoreError>;

    /// User count for every role present.
    async fn users_by_role(&self) -> Result<Vec<RoleCount>, StoreError>;

    /// Product buckets per category, largest first.
    async fn products_by_category(&self) -> Result<Vec<CategoryBucket>, StoreError>;

    /// Product buckets per status.
    async fn products_by_status(&self) -> Result<Vec<StatusBucket>, StoreError>;

    /// Round-trips to the backend.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_window_bounds_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let window = TimeWindow {
            from: Some(start),
            to: Some(end),
        };
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + chrono::Duration::milliseconds(1)));
        assert!(!window.contains(start - chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_time_window_through_is_open_below() {
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let window = TimeWindow::through(end);
        assert!(window.contains(Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap()));
        assert!(!window.contains(end + chrono::Duration::seconds(1)));
        assert!(TimeWindow::all().contains(end));
    }

    #[test]
    fn test_order_filters() {
        assert!(OrderFilter::settled(TimeWindow::all()).exclude_cancelled);
        assert!(!OrderFilter::all().exclude_cancelled);
    }
}
