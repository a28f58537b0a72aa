//! Analytics repository.
//!
//! Postgres implementation of [`AnalyticsStore`]. Every aggregation is a
//! single GROUP BY query; calendar days are taken in UTC.
//!
//! Ordering matches the in-memory store: products tied on units sold rank
//! by the first line that mentioned them (order time, order id, position),
//! and grouped buckets tied on first appearance rank by label bytes.

use async_trait::async_trait;
use sqlx::PgPool;

use domain::models::{
    CategoryBucket, DailySalesBucket, OrderAggregate, ProductRankEntry, RoleCount, SignupPoint,
    StatusBucket, TimeSeriesPoint,
};
use domain::services::{AnalyticsStore, OrderFilter, StoreError, TimeWindow};

use crate::entities::{
    non_negative, DailySalesBucketRow, DailySalesRow, OrderTotalsRow, ProductBucketRow,
    ProductRankRow, RoleCountRow, SignupRow,
};
use crate::metrics::QueryTimer;

/// Repository backing the admin analytics reports.
#[derive(Clone)]
pub struct PgAnalyticsStore {
    pool: PgPool,
}

impl PgAnalyticsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(query: &str, err: sqlx::Error) -> StoreError {
    tracing::error!(query = %query, error = %err, "Analytics query failed");
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl AnalyticsStore for PgAnalyticsStore {
    async fn count_users(&self, window: TimeWindow) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("analytics_count_users");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            "#,
        )
        .bind(window.from)
        .bind(window.to)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        let count = result.map_err(|e| store_error("count_users", e))?;
        non_negative("count", count)
    }

    async fn count_products(&self, window: TimeWindow) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("analytics_count_products");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            "#,
        )
        .bind(window.from)
        .bind(window.to)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        let count = result.map_err(|e| store_error("count_products", e))?;
        non_negative("count", count)
    }

    async fn order_aggregate(&self, filter: OrderFilter) -> Result<OrderAggregate, StoreError> {
        let timer = QueryTimer::new("analytics_order_aggregate");
        let result = sqlx::query_as::<_, OrderTotalsRow>(
            r#"
            SELECT
                COUNT(*) as count,
                COALESCE(SUM(total_amount), 0) as total_revenue
            FROM orders
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
              AND (NOT $3 OR status <> 'cancelled')
            "#,
        )
        .bind(filter.window.from)
        .bind(filter.window.to)
        .bind(filter.exclude_cancelled)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        result
            .map_err(|e| store_error("order_aggregate", e))?
            .try_into()
    }

    async fn daily_sales(&self, filter: OrderFilter) -> Result<Vec<TimeSeriesPoint>, StoreError> {
        let timer = QueryTimer::new("analytics_daily_sales");
        let result = sqlx::query_as::<_, DailySalesRow>(
            r#"
            SELECT
                (created_at AT TIME ZONE 'UTC')::date as day,
                COALESCE(SUM(total_amount), 0) as sales,
                COUNT(*) as orders
            FROM orders
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
              AND (NOT $3 OR status <> 'cancelled')
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(filter.window.from)
        .bind(filter.window.to)
        .bind(filter.exclude_cancelled)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        convert_all(result.map_err(|e| store_error("daily_sales", e))?)
    }

    async fn daily_sales_buckets(
        &self,
        filter: OrderFilter,
    ) -> Result<Vec<DailySalesBucket>, StoreError> {
        let timer = QueryTimer::new("analytics_daily_sales_buckets");
        let result = sqlx::query_as::<_, DailySalesBucketRow>(
            r#"
            SELECT
                (o.created_at AT TIME ZONE 'UTC')::date as day,
                COUNT(*) as orders,
                COALESCE(SUM(o.total_amount), 0) as revenue,
                COALESCE(SUM(lines.line_count), 0)::bigint as items_sold
            FROM orders o
            LEFT JOIN LATERAL (
                SELECT COUNT(*) as line_count
                FROM order_items oi
                WHERE oi.order_id = o.id
            ) lines ON TRUE
            WHERE ($1::timestamptz IS NULL OR o.created_at >= $1)
              AND ($2::timestamptz IS NULL OR o.created_at <= $2)
              AND (NOT $3 OR o.status <> 'cancelled')
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(filter.window.from)
        .bind(filter.window.to)
        .bind(filter.exclude_cancelled)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        convert_all(result.map_err(|e| store_error("daily_sales_buckets", e))?)
    }

    async fn top_products(
        &self,
        filter: OrderFilter,
        limit: usize,
    ) -> Result<Vec<ProductRankEntry>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let timer = QueryTimer::new("analytics_top_products");
        let result = sqlx::query_as::<_, ProductRankRow>(
            r#"
            SELECT
                oi.product_id,
                (ARRAY_AGG(oi.name ORDER BY o.created_at, o.id, oi.position))[1] as name,
                SUM(oi.quantity)::bigint as total_sold,
                COALESCE(SUM(oi.price * oi.quantity), 0) as total_revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE ($1::timestamptz IS NULL OR o.created_at >= $1)
              AND ($2::timestamptz IS NULL OR o.created_at <= $2)
              AND (NOT $3 OR o.status <> 'cancelled')
            GROUP BY oi.product_id
            ORDER BY
                total_sold DESC,
                MIN(o.created_at) ASC,
                (ARRAY_AGG(o.id ORDER BY o.created_at, o.id, oi.position))[1] ASC,
                (ARRAY_AGG(oi.position ORDER BY o.created_at, o.id, oi.position))[1] ASC
            LIMIT $4
            "#,
        )
        .bind(filter.window.from)
        .bind(filter.window.to)
        .bind(filter.exclude_cancelled)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        convert_all(result.map_err(|e| store_error("top_products", e))?)
    }

    async fn daily_signups(&self, window: TimeWindow) -> Result<Vec<SignupPoint>, StoreError> {
        let timer = QueryTimer::new("analytics_daily_signups");
        let result = sqlx::query_as::<_, SignupRow>(
            r#"
            SELECT
                (created_at AT TIME ZONE 'UTC')::date as day,
                COUNT(*) as count
            FROM users
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(window.from)
        .bind(window.to)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        convert_all(result.map_err(|e| store_error("daily_signups", e))?)
    }

    async fn users_by_role(&self) -> Result<Vec<RoleCount>, StoreError> {
        let timer = QueryTimer::new("analytics_users_by_role");
        let result = sqlx::query_as::<_, RoleCountRow>(
            r#"
            SELECT role, COUNT(*) as count
            FROM users
            GROUP BY role
            ORDER BY MIN(created_at) ASC, role COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();

        convert_all(result.map_err(|e| store_error("users_by_role", e))?)
    }

    async fn products_by_category(&self) -> Result<Vec<CategoryBucket>, StoreError> {
        let timer = QueryTimer::new("analytics_products_by_category");
        let result = sqlx::query_as::<_, ProductBucketRow>(
            r#"
            SELECT
                category as key,
                COUNT(*) as count,
                COALESCE(AVG(price), 0) as avg_price,
                COALESCE(SUM(stock), 0)::bigint as total_stock
            FROM products
            GROUP BY category
            ORDER BY count DESC, MIN(created_at) ASC, category COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();

        convert_all(result.map_err(|e| store_error("products_by_category", e))?)
    }

    async fn products_by_status(&self) -> Result<Vec<StatusBucket>, StoreError> {
        let timer = QueryTimer::new("analytics_products_by_status");
        let result = sqlx::query_as::<_, ProductBucketRow>(
            r#"
            SELECT
                status as key,
                COUNT(*) as count,
                COALESCE(AVG(price), 0) as avg_price,
                COALESCE(SUM(stock), 0)::bigint as total_stock
            FROM products
            GROUP BY status
            ORDER BY MIN(created_at) ASC, status COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();

        convert_all(result.map_err(|e| store_error("products_by_status", e))?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| store_error("ping", e))
    }
}
