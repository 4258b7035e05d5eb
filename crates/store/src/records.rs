//! Row types read from and written to the store.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use rust_decimal::Decimal;
use serde::Serialize;

/// Lifecycle status of an order.
///
/// Orders are only ever created by the placement workflow, so `Pending`
/// is the only status this service writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
}

impl OrderStatus {
    /// Returns the value stored in `orders.status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row in `users`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row in `products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Number of products matching the filter across all pages.
    pub total: i64,
}

/// Header of an order about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub status: OrderStatus,
}

/// One line of an order about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
}

/// Identity assigned by the store when an order header is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedOrder {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockReservation {
    /// Stock was decremented; carries the unit price read in the same statement.
    Reserved { unit_price: Decimal },
    /// No product with the requested ID exists.
    NotFound,
    /// The product exists but holds fewer units than requested. Nothing changed.
    Insufficient { available: i32 },
}

/// An order joined with its owner and line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetails {
    pub order_id: OrderId,
    pub total_amount: Decimal,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub username: String,
    pub email: String,
    pub items: Vec<OrderDetailItem>,
}

/// A line item inside [`OrderDetails`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetailItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}
