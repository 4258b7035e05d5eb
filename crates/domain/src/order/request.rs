//! Incoming order payloads and their validation.

use common::{ProductId, UserId};
use serde::Deserialize;
use thiserror::Error;

/// Reasons an order request is rejected before any database work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("user_id is required")]
    MissingUserId,

    #[error("items must be a non-empty list")]
    NoItems,

    #[error("item {index}: product_id is required")]
    MissingProductId { index: usize },

    #[error("item {index}: quantity is required")]
    MissingQuantity { index: usize },

    #[error("item {index}: quantity for product {product_id} must be a positive integer, got {quantity}")]
    InvalidQuantity {
        index: usize,
        product_id: ProductId,
        quantity: i32,
    },
}

/// A positive number of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(i32);

impl Quantity {
    /// Returns `None` unless `n` is at least 1.
    pub fn new(n: i32) -> Option<Self> {
        (n > 0).then_some(Self(n))
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

/// A raw order request as received over the wire.
///
/// Every field is optional so that missing values are reported by
/// [`OrderRequest::validate`] rather than by the deserializer. Unknown
/// fields are rejected during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRequest {
    pub user_id: Option<UserId>,
    pub items: Option<Vec<LineItemRequest>>,
}

/// A raw line item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItemRequest {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i32>,
}

impl OrderRequest {
    /// Creates a request with every field present.
    pub fn new(user_id: UserId, items: impl IntoIterator<Item = (ProductId, i32)>) -> Self {
        Self {
            user_id: Some(user_id),
            items: Some(
                items
                    .into_iter()
                    .map(|(product_id, quantity)| LineItemRequest {
                        product_id: Some(product_id),
                        quantity: Some(quantity),
                    })
                    .collect(),
            ),
        }
    }

    /// Checks presence and shape, producing a [`ValidatedOrder`].
    ///
    /// Items are checked in request order and the first offending item
    /// is reported.
    pub fn validate(self) -> Result<ValidatedOrder, ValidationError> {
        let user_id = self
            .user_id
            .filter(|id| id.as_i32() > 0)
            .ok_or(ValidationError::MissingUserId)?;

        let raw_items = self.items.unwrap_or_default();
        if raw_items.is_empty() {
            return Err(ValidationError::NoItems);
        }

        let items = raw_items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let product_id = item
                    .product_id
                    .ok_or(ValidationError::MissingProductId { index })?;
                let raw_quantity = item
                    .quantity
                    .ok_or(ValidationError::MissingQuantity { index })?;
                let quantity =
                    Quantity::new(raw_quantity).ok_or(ValidationError::InvalidQuantity {
                        index,
                        product_id,
                        quantity: raw_quantity,
                    })?;
                Ok(LineItem {
                    product_id,
                    quantity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedOrder { user_id, items })
    }
}

/// A line item that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// An order request with a known owner and at least one well-formed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    user_id: UserId,
    items: Vec<LineItem>,
}

impl ValidatedOrder {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Line items in request order. Never empty.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }
}
