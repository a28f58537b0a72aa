//! Admin analytics routes.
//!
//! Dashboard, sales report, user analytics and product analytics. All
//! responses use the `{ success, data }` envelope.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedQuery;
use crate::middleware::{record_report_generated, AdminAuth};
use domain::models::{
    DashboardQuery, DashboardReport, ProductAnalyticsQuery, ProductAnalyticsReport, SalesReport,
    SalesReportQuery, UserAnalyticsQuery, UserAnalyticsReport,
};
use domain::services::RangePolicy;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Build the versioned analytics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/sales-report", get(get_sales_report))
        .route("/users", get(get_user_analytics))
        .route("/products", get(get_product_analytics))
}

/// Build the unversioned analytics router kept for older admin clients.
pub fn legacy_router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_legacy_dashboard))
}

/// Dashboard with strict range validation.
async fn get_dashboard(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    ValidatedQuery(query): ValidatedQuery<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardReport>>, ApiError> {
    dashboard(&state, &admin, &query, RangePolicy::Strict).await
}

/// Dashboard with lenient range parsing; unknown keywords fall back to today.
async fn get_legacy_dashboard(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardReport>>, ApiError> {
    dashboard(&state, &admin, &query, RangePolicy::Lenient).await
}

async fn dashboard(
    state: &AppState,
    admin: &AdminAuth,
    query: &DashboardQuery,
    policy: RangePolicy,
) -> Result<Json<ApiResponse<DashboardReport>>, ApiError> {
    let range = state.engine.resolve_range(
        policy,
        query.range.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?;

    let report = state
        .engine
        .compute_dashboard(&range, state.config.analytics.dashboard_top_products)
        .await?;

    record_report_generated("dashboard");
    tracing::info!(
        admin = %admin.subject,
        range = %range.label,
        start = %range.start,
        end = %range.end,
        period_orders = report.summary.period_orders,
        period_revenue = %report.summary.period_revenue,
        "Dashboard report generated"
    );

    Ok(ApiResponse::ok(report))
}

/// Daily sales between `startDate` and `endDate` (both default to today).
async fn get_sales_report(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    ValidatedQuery(query): ValidatedQuery<SalesReportQuery>,
) -> Result<Json<ApiResponse<SalesReport>>, ApiError> {
    let report = state
        .engine
        .compute_sales_report(query.start_date.as_deref(), query.end_date.as_deref())
        .await?;

    record_report_generated("sales_report");
    tracing::info!(
        admin = %admin.subject,
        start = %report.date_range.start,
        end = %report.date_range.end,
        days = report.daily_data.len(),
        total_orders = report.totals.total_orders,
        "Sales report generated"
    );

    Ok(ApiResponse::ok(report))
}

/// Signups over the last `days` days and users per role.
async fn get_user_analytics(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    ValidatedQuery(query): ValidatedQuery<UserAnalyticsQuery>,
) -> Result<Json<ApiResponse<UserAnalyticsReport>>, ApiError> {
    let report = state.engine.compute_user_analytics(query.days).await?;

    record_report_generated("user_analytics");
    tracing::info!(
        admin = %admin.subject,
        days = ?query.days,
        signup_days = report.user_signups.len(),
        "User analytics generated"
    );

    Ok(ApiResponse::ok(report))
}

/// Best sellers and catalog breakdowns.
async fn get_product_analytics(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    ValidatedQuery(query): ValidatedQuery<ProductAnalyticsQuery>,
) -> Result<Json<ApiResponse<ProductAnalyticsReport>>, ApiError> {
    let limit = query
        .limit
        .map(|l| l as usize)
        .unwrap_or(state.config.analytics.top_selling_limit);
    let report = state.engine.compute_product_analytics(Some(limit)).await?;

    record_report_generated("product_analytics");
    tracing::info!(
        admin = %admin.subject,
        limit = limit,
        top_selling = report.top_selling.len(),
        categories = report.products_by_category.len(),
        "Product analytics generated"
    );

    Ok(ApiResponse::ok(report))
}
