//! Order domain model.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Orders whose item total exceeds this ship for free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = dec!(100);

/// Flat shipping charge below the free-shipping threshold.
pub const FLAT_SHIPPING_PRICE: Decimal = dec!(10);

/// Sales tax applied to the item total.
pub const TAX_RATE: Decimal = dec!(0.10);

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn new(product_id: Uuid, name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            product_id,
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Price multiplied by quantity.
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Price breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_amount: Decimal,
}

impl OrderPricing {
    /// Prices a set of line items using the storefront checkout rules.
    pub fn for_items(items: &[OrderItem]) -> Self {
        let items_price: Decimal = items.iter().map(OrderItem::line_total).sum();
        let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING_PRICE
        };
        let tax_price = round_money(items_price * TAX_RATE);
        let total_amount = round_money(items_price + shipping_price + tax_price);

        Self {
            items_price,
            tax_price,
            shipping_price,
            total_amount,
        }
    }
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A customer order as read by the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates an order and prices it from its items.
    pub fn new(
        user_id: Uuid,
        items: Vec<OrderItem>,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        let pricing = OrderPricing::for_items(&items);
        Self {
            id: Uuid::new_v4(),
            user_id,
            items,
            items_price: pricing.items_price,
            tax_price: pricing.tax_price,
            shipping_price: pricing.shipping_price,
            total_amount: pricing.total_amount,
            status,
            created_at,
        }
    }

    /// Overrides the stored total, for orders imported with an agreed amount.
    pub fn with_total_amount(mut self, total_amount: Decimal) -> Self {
        self.total_amount = total_amount;
        self
    }

    /// Number of line items (not units).
    pub fn line_count(&self) -> u64 {
        self.items.len() as u64
    }
}
