//! Analytics domain models.
//!
//! Report payloads for the admin dashboard, sales report, user analytics and
//! product analytics, plus the query parameters that drive them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use shared::validation::{validate_date_order, validate_iso8601};

/// Number of products shown on the dashboard chart.
pub const DASHBOARD_TOP_PRODUCTS: usize = 5;

/// Default number of products in the product analytics ranking.
pub const DEFAULT_TOP_SELLING_LIMIT: usize = 10;

/// Default look-back window for user analytics.
pub const DEFAULT_USER_ANALYTICS_DAYS: u32 = 30;

// ============================================================================
// Ranges
// ============================================================================

/// Relative range selector for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKeyword {
    Today,
    Yesterday,
    Weekly,
    Monthly,
    Custom,
}

impl RangeKeyword {
    pub const ALL: [RangeKeyword; 5] = [
        RangeKeyword::Today,
        RangeKeyword::Yesterday,
        RangeKeyword::Weekly,
        RangeKeyword::Monthly,
        RangeKeyword::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKeyword::Today => "today",
            RangeKeyword::Yesterday => "yesterday",
            RangeKeyword::Weekly => "weekly",
            RangeKeyword::Monthly => "monthly",
            RangeKeyword::Custom => "custom",
        }
    }
}

impl fmt::Display for RangeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A closed reporting window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "range")]
    pub label: RangeKeyword,
}

impl DateRange {
    /// Builds a range from raw timestamps. Returns `None` when `end < start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, label: RangeKeyword) -> Option<Self> {
        (start <= end).then_some(Self { start, end, label })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    /// The window without its label.
    pub fn period(&self) -> ReportPeriod {
        ReportPeriod {
            start: self.start,
            end: self.end,
        }
    }
}

/// Start and end of a report, as echoed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// ============================================================================
// Aggregates and buckets
// ============================================================================

/// Count, sum and mean of order totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAggregate {
    pub count: u64,
    pub total_revenue: Decimal,
    pub avg_order_value: Decimal,
}

impl OrderAggregate {
    /// Builds the aggregate from a count and a sum; the mean is zero when empty.
    pub fn from_totals(count: u64, total_revenue: Decimal) -> Self {
        let avg_order_value = if count == 0 {
            Decimal::ZERO
        } else {
            total_revenue / Decimal::from(count)
        };
        Self {
            count,
            total_revenue,
            avg_order_value,
        }
    }
}

/// Sales for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub orders: u64,
}

/// One product in a best-seller ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRankEntry {
    pub product_id: Uuid,
    pub name: String,
    pub total_sold: u64,
    pub total_revenue: Decimal,
}

/// Sales report row for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesBucket {
    pub date: NaiveDate,
    pub orders: u64,
    pub revenue: Decimal,
    /// Number of order lines, not units.
    pub items_sold: u64,
}

/// Sum of all daily buckets in a sales report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub total_items_sold: u64,
}

impl SalesTotals {
    pub fn from_buckets(buckets: &[DailySalesBucket]) -> Self {
        buckets.iter().fold(Self::default(), |acc, bucket| Self {
            total_orders: acc.total_orders + bucket.orders,
            total_revenue: acc.total_revenue + bucket.revenue,
            total_items_sold: acc.total_items_sold + bucket.items_sold,
        })
    }
}

/// New accounts created on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPoint {
    pub date: NaiveDate,
    pub count: u64,
}

/// Number of users holding a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCount {
    pub role: String,
    pub count: u64,
}

/// Products grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    pub category: String,
    pub count: u64,
    pub avg_price: Decimal,
    pub total_stock: i64,
}

/// Products grouped by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBucket {
    pub status: String,
    pub count: u64,
    pub avg_price: Decimal,
    pub total_stock: i64,
}

// ============================================================================
// Report payloads
// ============================================================================

/// Headline figures of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_users: u64,
    pub new_users: u64,
    pub total_products: u64,
    pub new_products: u64,
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub avg_order_value: Decimal,
    pub period_orders: u64,
    pub period_revenue: Decimal,
    pub avg_period_order_value: Decimal,
    pub date_range: DateRange,
}

/// Chart series of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub sales_data: Vec<TimeSeriesPoint>,
    pub top_products: Vec<ProductRankEntry>,
}

/// Dashboard report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardReport {
    pub summary: DashboardSummary,
    pub charts: DashboardCharts,
}

/// Sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub date_range: ReportPeriod,
    pub totals: SalesTotals,
    pub daily_data: Vec<DailySalesBucket>,
}

/// User analytics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalyticsReport {
    pub date_range: ReportPeriod,
    pub user_signups: Vec<SignupPoint>,
    pub users_by_role: Vec<RoleCount>,
}

/// Product analytics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalyticsReport {
    pub top_selling: Vec<ProductRankEntry>,
    pub products_by_category: Vec<CategoryBucket>,
    pub products_by_status: Vec<StatusBucket>,
}

// ============================================================================
// Query parameters
// ============================================================================

/// Query parameters for the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default, rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, rename = "endDate")]
    pub end_date: Option<String>,
}

impl Validate for DashboardQuery {
    /// Strict validation used by the versioned dashboard route.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(range) = self.range.as_deref() {
            if !RangeKeyword::ALL.iter().any(|k| k.as_str() == range) {
                errors.add("range", unknown_range_error());
            }
        }

        let custom = self.range.as_deref() == Some(RangeKeyword::Custom.as_str());
        if custom {
            if is_blank(self.start_date.as_deref()) {
                errors.add("startDate", required_error("startDate is required when range is custom"));
            }
            if is_blank(self.end_date.as_deref()) {
                errors.add("endDate", required_error("endDate is required when range is custom"));
            }
        }

        check_date_params(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            &mut errors,
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Query parameters for the sales report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesReportQuery {
    #[serde(default, rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, rename = "endDate")]
    pub end_date: Option<String>,
}

impl Validate for SalesReportQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_date_params(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            &mut errors,
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Query parameters for user analytics.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserAnalyticsQuery {
    #[serde(default)]
    #[validate(range(min = 1, max = 365, message = "Days must be an integer between 1 and 365"))]
    pub days: Option<u32>,
}

/// Query parameters for product analytics.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductAnalyticsQuery {
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "Limit must be an integer between 1 and 100"))]
    pub limit: Option<u32>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).map_or(true, str::is_empty)
}

fn check_date_params(start: Option<&str>, end: Option<&str>, errors: &mut ValidationErrors) {
    let start = start.filter(|s| !s.trim().is_empty());
    let end = end.filter(|s| !s.trim().is_empty());

    if let Some(start) = start {
        if let Err(mut err) = validate_iso8601(start) {
            err.message = Some("startDate must be a valid ISO 8601 date".into());
            errors.add("startDate", err);
        }
    }
    if let Some(end) = end {
        if let Err(mut err) = validate_iso8601(end) {
            err.message = Some("endDate must be a valid ISO 8601 date".into());
            errors.add("endDate", err);
        }
    }
    if let (Some(start), Some(end)) = (start, end) {
        if let Err(err) = validate_date_order(start, end) {
            errors.add("endDate", err);
        }
    }
}

fn unknown_range_error() -> ValidationError {
    let mut err = ValidationError::new("range");
    err.message = Some(
        "Invalid range parameter. Must be one of: today, yesterday, weekly, monthly, custom".into(),
    );
    err
}

fn required_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("required");
    err.message = Some(message.into());
    err
}
