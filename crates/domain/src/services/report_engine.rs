//! Report engine.
//!
//! Resolves the reporting window, asks the store for aggregated figures and
//! assembles the report payloads. Nothing is kept between calls.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::{
    DashboardCharts, DashboardReport, DashboardSummary, DateRange, ProductAnalyticsReport,
    RangeKeyword, SalesReport, SalesTotals, UserAnalyticsReport, DEFAULT_TOP_SELLING_LIMIT,
    DEFAULT_USER_ANALYTICS_DAYS,
};
use crate::services::clock::Clock;
use crate::services::date_range::{self, RangePolicy};
use crate::services::store::{AnalyticsStore, OrderFilter, StoreError, TimeWindow};

/// Errors produced while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested window cannot be resolved. Caller error.
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// The range keyword is not one of the known keywords.
    #[error("Unknown range keyword: {0}")]
    UnknownRange(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Builds analytics reports on top of an [`AnalyticsStore`].
#[derive(Clone)]
pub struct ReportEngine {
    store: Arc<dyn AnalyticsStore>,
    clock: Arc<dyn Clock>,
}

impl ReportEngine {
    pub fn new(store: Arc<dyn AnalyticsStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Turns a raw range keyword plus optional custom bounds into a window.
    pub fn resolve_range(
        &self,
        policy: RangePolicy,
        keyword: Option<&str>,
        custom_start: Option<&str>,
        custom_end: Option<&str>,
    ) -> Result<DateRange, ReportError> {
        let keyword = policy.parse_keyword(keyword)?;
        date_range::resolve_range(keyword, custom_start, custom_end, self.clock.now())
    }

    /// Dashboard summary and charts for `range`.
    ///
    /// Cumulative figures cover everything created up to `range.end`; period
    /// figures cover the range itself. Cancelled orders never count.
    #[instrument(skip(self, range), fields(range = %range.label))]
    pub async fn compute_dashboard(
        &self,
        range: &DateRange,
        top_products: usize,
    ) -> Result<DashboardReport, ReportError> {
        let cumulative = TimeWindow::through(range.end);
        let period = TimeWindow::within(range);

        let (
            total_users,
            new_users,
            total_products,
            new_products,
            overall,
            in_period,
            sales_data,
            top,
        ) = tokio::try_join!(
            self.store.count_users(cumulative),
            self.store.count_users(period),
            self.store.count_products(cumulative),
            self.store.count_products(period),
            self.store.order_aggregate(OrderFilter::settled(cumulative)),
            self.store.order_aggregate(OrderFilter::settled(period)),
            self.store.daily_sales(OrderFilter::settled(period)),
            self.store
                .top_products(OrderFilter::settled(period), top_products),
        )?;

        debug!(
            period_orders = in_period.count,
            total_orders = overall.count,
            "Dashboard aggregates computed"
        );

        Ok(DashboardReport {
            summary: DashboardSummary {
                total_users,
                new_users,
                total_products,
                new_products,
                total_orders: overall.count,
                total_revenue: overall.total_revenue,
                avg_order_value: overall.avg_order_value,
                period_orders: in_period.count,
                period_revenue: in_period.total_revenue,
                avg_period_order_value: in_period.avg_order_value,
                date_range: *range,
            },
            charts: DashboardCharts {
                sales_data,
                top_products: top,
            },
        })
    }

    /// Daily sales between two dates. Missing bounds default to today.
    #[instrument(skip(self))]
    pub async fn compute_sales_report(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<SalesReport, ReportError> {
        let now = self.clock.now();
        let start = date_range::parse_bound(start, Some(now))?;
        let end = date_range::parse_bound(end, Some(now))?;
        let range = date_range::normalize_window(start, end, RangeKeyword::Custom)?;

        let daily_data = self
            .store
            .daily_sales_buckets(OrderFilter::settled(TimeWindow::within(&range)))
            .await?;

        Ok(SalesReport {
            date_range: range.period(),
            totals: SalesTotals::from_buckets(&daily_data),
            daily_data,
        })
    }

    /// Signups over the last `days` days and the user count per role.
    #[instrument(skip(self))]
    pub async fn compute_user_analytics(
        &self,
        days: Option<u32>,
    ) -> Result<UserAnalyticsReport, ReportError> {
        let days = days.unwrap_or(DEFAULT_USER_ANALYTICS_DAYS);
        let range = date_range::trailing_days(days, self.clock.now())?;

        let (user_signups, users_by_role) = tokio::try_join!(
            self.store.daily_signups(TimeWindow::within(&range)),
            self.store.users_by_role(),
        )?;

        Ok(UserAnalyticsReport {
            date_range: range.period(),
            user_signups,
            users_by_role,
        })
    }

    /// All-time best sellers plus category and status breakdowns.
    ///
    /// The best-seller ranking counts every order regardless of status.
    #[instrument(skip(self))]
    pub async fn compute_product_analytics(
        &self,
        limit: Option<usize>,
    ) -> Result<ProductAnalyticsReport, ReportError> {
        let limit = limit.unwrap_or(DEFAULT_TOP_SELLING_LIMIT);

        let (top_selling, products_by_category, products_by_status) = tokio::try_join!(
            self.store.top_products(OrderFilter::all(), limit),
            self.store.products_by_category(),
            self.store.products_by_status(),
        )?;

        Ok(ProductAnalyticsReport {
            top_selling,
            products_by_category,
            products_by_status,
        })
    }
}

impl std::fmt::Debug for ReportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEngine").finish_non_exhaustive()
    }
}
