//! Analytics query rows.
//!
//! Aggregation results as returned by Postgres. Counts come back as BIGINT and
//! are converted to the unsigned domain counters on the way out.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{
    CategoryBucket, DailySalesBucket, OrderAggregate, ProductRankEntry, RoleCount, SignupPoint,
    StatusBucket, TimeSeriesPoint,
};
use domain::services::StoreError;

/// Converts a BIGINT count into an unsigned counter.
pub fn non_negative(column: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Decode {
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Row of the order count / revenue query.
#[derive(Debug, Clone, FromRow)]
pub struct OrderTotalsRow {
    pub count: i64,
    pub total_revenue: Decimal,
}

impl TryFrom<OrderTotalsRow> for OrderAggregate {
    type Error = StoreError;

    fn try_from(row: OrderTotalsRow) -> Result<Self, Self::Error> {
        Ok(OrderAggregate::from_totals(
            non_negative("count", row.count)?,
            row.total_revenue,
        ))
    }
}

/// Row of the daily sales series.
#[derive(Debug, Clone, FromRow)]
pub struct DailySalesRow {
    pub day: NaiveDate,
    pub sales: Decimal,
    pub orders: i64,
}

impl TryFrom<DailySalesRow> for TimeSeriesPoint {
    type Error = StoreError;

    fn try_from(row: DailySalesRow) -> Result<Self, Self::Error> {
        Ok(TimeSeriesPoint {
            date: row.day,
            sales: row.sales,
            orders: non_negative("orders", row.orders)?,
        })
    }
}

/// Row of the sales report buckets.
#[derive(Debug, Clone, FromRow)]
pub struct DailySalesBucketRow {
    pub day: NaiveDate,
    pub orders: i64,
    pub revenue: Decimal,
    pub items_sold: i64,
}

impl TryFrom<DailySalesBucketRow> for DailySalesBucket {
    type Error = StoreError;

    fn try_from(row: DailySalesBucketRow) -> Result<Self, Self::Error> {
        Ok(DailySalesBucket {
            date: row.day,
            orders: non_negative("orders", row.orders)?,
            revenue: row.revenue,
            items_sold: non_negative("items_sold", row.items_sold)?,
        })
    }
}

/// Row of the best-seller ranking.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRankRow {
    pub product_id: Uuid,
    pub name: String,
    pub total_sold: i64,
    pub total_revenue: Decimal,
}

impl TryFrom<ProductRankRow> for ProductRankEntry {
    type Error = StoreError;

    fn try_from(row: ProductRankRow) -> Result<Self, Self::Error> {
        Ok(ProductRankEntry {
            product_id: row.product_id,
            name: row.name,
            total_sold: non_negative("total_sold", row.total_sold)?,
            total_revenue: row.total_revenue,
        })
    }
}

/// Row of the daily signups series.
#[derive(Debug, Clone, FromRow)]
pub struct SignupRow {
    pub day: NaiveDate,
    pub count: i64,
}

impl TryFrom<SignupRow> for SignupPoint {
    type Error = StoreError;

    fn try_from(row: SignupRow) -> Result<Self, Self::Error> {
        Ok(SignupPoint {
            date: row.day,
            count: non_negative("count", row.count)?,
        })
    }
}

/// Row of the users-per-role query.
#[derive(Debug, Clone, FromRow)]
pub struct RoleCountRow {
    pub role: String,
    pub count: i64,
}

impl TryFrom<RoleCountRow> for RoleCount {
    type Error = StoreError;

    fn try_from(row: RoleCountRow) -> Result<Self, Self::Error> {
        Ok(RoleCount {
            role: row.role,
            count: non_negative("count", row.count)?,
        })
    }
}

/// Row of the product category / status breakdowns.
#[derive(Debug, Clone, FromRow)]
pub struct ProductBucketRow {
    pub key: String,
    pub count: i64,
    pub avg_price: Decimal,
    pub total_stock: i64,
}

impl TryFrom<ProductBucketRow> for CategoryBucket {
    type Error = StoreError;

    fn try_from(row: ProductBucketRow) -> Result<Self, Self::Error> {
        Ok(CategoryBucket {
            category: row.key,
            count: non_negative("count", row.count)?,
            avg_price: row.avg_price,
            total_stock: row.total_stock,
        })
    }
}

impl TryFrom<ProductBucketRow> for StatusBucket {
    type Error = StoreError;

    fn try_from(row: ProductBucketRow) -> Result<Self, Self::Error> {
        Ok(StatusBucket {
            status: row.key,
            count: non_negative("count", row.count)?,
            avg_price: row.avg_price,
            total_stock: row.total_stock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_count_is_decode_error() {
        let err = non_negative("count", -1).unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
        assert_eq!(non_negative("count", 7).unwrap(), 7);
    }

    #[test]
    fn test_order_totals_row_to_aggregate() {
        let agg = OrderAggregate::try_from(OrderTotalsRow {
            count: 2,
            total_revenue: dec!(30),
        })
        .unwrap();
        assert_eq!(agg.avg_order_value, dec!(15));

        let empty = OrderAggregate::try_from(OrderTotalsRow {
            count: 0,
            total_revenue: Decimal::ZERO,
        })
        .unwrap();
        assert_eq!(empty, OrderAggregate::default());
    }

    #[test]
    fn test_product_bucket_row_maps_key() {
        let row = ProductBucketRow {
            key: "Books".to_string(),
            count: 3,
            avg_price: dec!(12.5),
            total_stock: 40,
        };
        let bucket = CategoryBucket::try_from(row.clone()).unwrap();
        assert_eq!(bucket.category, "Books");
        let bucket = StatusBucket::try_from(row).unwrap();
        assert_eq!(bucket.status, "Books");
        assert_eq!(bucket.total_stock, 40);
    }
}
