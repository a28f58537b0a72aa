//! Common helpers for tests that run the Postgres store against a real
//! database.
//!
//! Set `TEST_DATABASE_URL` to enable them. Every test gets a private schema
//! with fresh migrations, so tests can run in parallel on one database.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// A migrated schema that is dropped by [`TestDb::cleanup`].
pub struct TestDb {
    pub pool: PgPool,
    schema: String,
}

impl TestDb {
    pub async fn cleanup(self) {
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .execute(&self.pool)
            .await
            .ok();
        self.pool.close().await;
    }
}

/// Connects to `TEST_DATABASE_URL` inside a new schema and migrates it.
///
/// Returns `None` when the variable is not set.
pub async fn create_test_db() -> Option<TestDb> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let schema = format!("shopdesk_test_{}", Uuid::new_v4().simple());

    let bootstrap = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::query(&format!("CREATE SCHEMA {}", schema))
        .execute(&bootstrap)
        .await
        .expect("Failed to create test schema");
    bootstrap.close().await;

    let options: PgConnectOptions = database_url
        .parse::<PgConnectOptions>()
        .expect("Invalid TEST_DATABASE_URL")
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .expect("Failed to connect to test schema");

    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(TestDb { pool, schema })
}

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0).unwrap()
}

pub async fn insert_user(pool: &PgPool, role: &str, created_at: DateTime<Utc>) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, full_name, email, role, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind("Test User")
    .bind(format!("{}@shopdesk.test", id.simple()))
    .bind(role)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("Failed to insert user");
    id
}

pub async fn insert_product(
    pool: &PgPool,
    price: Decimal,
    stock: i64,
    category: &str,
    status: &str,
    created_at: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO products (id, name, price, stock, category, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(format!("Product {}", id.simple()))
    .bind(price)
    .bind(stock)
    .bind(category)
    .bind(status)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("Failed to insert product");
    id
}

/// One order line: product, name, quantity, unit price.
pub type Line<'a> = (Uuid, &'a str, i32, Decimal);

/// Inserts an order with lines numbered in slice order.
pub async fn insert_order(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    status: &str,
    total: Decimal,
    created_at: DateTime<Utc>,
    lines: &[Line<'_>],
) {
    sqlx::query(
        r#"
        INSERT INTO orders (id, user_id, total_amount, status, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(total)
    .bind(status)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("Failed to insert order");

    for (position, (product_id, name, quantity, price)) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, position, product_id, name, quantity, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(position as i32)
        .bind(product_id)
        .bind(name)
        .bind(quantity)
        .bind(price)
        .execute(pool)
        .await
        .expect("Failed to insert order item");
    }
}
