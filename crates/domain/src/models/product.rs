//! Catalog product domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Books,
    #[serde(rename = "Home & Kitchen")]
    HomeAndKitchen,
    Beauty,
    Sports,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "Electronics",
            ProductCategory::Clothing => "Clothing",
            ProductCategory::Books => "Books",
            ProductCategory::HomeAndKitchen => "Home & Kitchen",
            ProductCategory::Beauty => "Beauty",
            ProductCategory::Sports => "Sports",
            ProductCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Electronics" => Ok(ProductCategory::Electronics),
            "Clothing" => Ok(ProductCategory::Clothing),
            "Books" => Ok(ProductCategory::Books),
            "Home & Kitchen" => Ok(ProductCategory::HomeAndKitchen),
            "Beauty" => Ok(ProductCategory::Beauty),
            "Sports" => Ok(ProductCategory::Sports),
            "Other" => Ok(ProductCategory::Other),
            _ => Err(format!("Invalid product category: {}", s)),
        }
    }
}

/// Catalog visibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "Active",
            ProductStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    pub category: ProductCategory,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        price: Decimal,
        stock: i64,
        category: ProductCategory,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            stock,
            category,
            status: ProductStatus::Active,
            created_at,
        }
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }
}
