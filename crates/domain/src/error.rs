//! Order placement error types.

use common::ProductId;
use store::StoreError;
use thiserror::Error;

use crate::order::ValidationError;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was malformed. No transaction was opened.
    #[error("Invalid request body: {0}")]
    Validation(#[from] ValidationError),

    /// A line item referenced a product that does not exist.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// A line item asked for more units than the product holds.
    #[error("Insufficient stock for product {product_id}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    /// The store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The placement did not finish within the configured deadline.
    #[error("Order placement timed out")]
    TimedOut,
}

impl OrderError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "validation",
            OrderError::ProductNotFound(_) => "product_not_found",
            OrderError::InsufficientStock { .. } => "insufficient_stock",
            OrderError::Storage(_) => "storage",
            OrderError::TimedOut => "timeout",
        }
    }

    /// Returns true for failures caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OrderError::Validation(_)
                | OrderError::ProductNotFound(_)
                | OrderError::InsufficientStock { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_product() {
        assert_eq!(
            OrderError::ProductNotFound(ProductId::new(999)).to_string(),
            "Product 999 not found"
        );
        assert_eq!(
            OrderError::InsufficientStock {
                product_id: ProductId::new(2),
                requested: 3,
                available: 1,
            }
            .to_string(),
            "Insufficient stock for product 2"
        );
    }

    #[test]
    fn test_storage_errors_are_not_client_errors() {
        let err = OrderError::from(StoreError::Unavailable("down".into()));
        assert!(!err.is_client_error());
        assert_eq!(err.reason(), "storage");
        assert!(OrderError::from(ValidationError::NoItems).is_client_error());
    }
}
