//! Domain models for Shopdesk analytics.

pub mod analytics;
pub mod order;
pub mod product;
pub mod user;

pub use analytics::*;
pub use order::{Order, OrderItem, OrderPricing, OrderStatus};
pub use product::{Product, ProductCategory, ProductStatus};
pub use user::{User, UserRole};
