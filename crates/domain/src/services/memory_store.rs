//! In-memory analytics store for development and testing.

use async_trait::async_trait;

use crate::models::{
    CategoryBucket, DailySalesBucket, Order, OrderAggregate, Product, ProductRankEntry,
    RoleCount, SignupPoint, StatusBucket, TimeSeriesPoint, User,
};
use crate::services::aggregation;
use crate::services::store::{AnalyticsStore, OrderFilter, StoreError, TimeWindow};

/// Holds users, products and orders in vectors and aggregates them on demand.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnalyticsStore {
    users: Vec<User>,
    products: Vec<Product>,
    orders: Vec<Order>,
    /// Whether every query fails, for testing error paths.
    pub simulate_failure: bool,
}

impl InMemoryAnalyticsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose queries always fail.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users.extend(users);
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products.extend(products);
        self
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders.extend(orders);
        self
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.simulate_failure {
            tracing::warn!("In-memory analytics store simulating failure");
            return Err(StoreError::Unavailable("Simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn count_users(&self, window: TimeWindow) -> Result<u64, StoreError> {
        self.check()?;
        Ok(aggregation::count_users(&self.users, window))
    }

    async fn count_products(&self, window: TimeWindow) -> Result<u64, StoreError> {
        self.check()?;
        Ok(aggregation::count_products(&self.products, window))
    }

    async fn order_aggregate(&self, filter: OrderFilter) -> Result<OrderAggregate, StoreError> {
        self.check()?;
        Ok(aggregation::order_aggregate(&self.orders, &filter))
    }

    async fn daily_sales(&self, filter: OrderFilter) -> Result<Vec<TimeSeriesPoint>, StoreError> {
        self.check()?;
        Ok(aggregation::daily_sales(&self.orders, &filter))
    }

    async fn daily_sales_buckets(
        &self,
        filter: OrderFilter,
    ) -> Result<Vec<DailySalesBucket>, StoreError> {
        self.check()?;
        Ok(aggregation::daily_sales_buckets(&self.orders, &filter))
    }

    async fn top_products(
        &self,
        filter: OrderFilter,
        limit: usize,
    ) -> Result<Vec<ProductRankEntry>, StoreError> {
        self.check()?;
        Ok(aggregation::top_products(&self.orders, &filter, limit))
    }

    async fn daily_signups(&self, window: TimeWindow) -> Result<Vec<SignupPoint>, StoreError> {
        self.check()?;
        Ok(aggregation::daily_signups(&self.users, window))
    }

    async fn users_by_role(&self) -> Result<Vec<RoleCount>, StoreError> {
        self.check()?;
        Ok(aggregation::users_by_role(&self.users))
    }

    async fn products_by_category(&self) -> Result<Vec<CategoryBucket>, StoreError> {
        self.check()?;
        Ok(aggregation::products_by_category(&self.products))
    }

    async fn products_by_status(&self) -> Result<Vec<StatusBucket>, StoreError> {
        self.check()?;
        Ok(aggregation::products_by_status(&self.products))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
