//! Order placement for the order service.
//!
//! This crate provides:
//! - Request validation into a statically-shaped [`ValidatedOrder`]
//! - Inventory reservation with decimal totals
//! - Order assembly with prices frozen at reservation time
//! - [`OrderService`], which runs reservation and assembly as one
//!   atomic unit over a scoped store session

pub mod error;
pub mod money;
pub mod order;

pub use error::OrderError;
pub use money::Money;
pub use order::{
    LineItem, LineItemRequest, OrderRequest, OrderService, PlacedOrder, Quantity, Reservation,
    ReservedLine, ValidatedOrder, ValidationError, assemble_order, reserve_items,
};
