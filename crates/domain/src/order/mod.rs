//! The order-placement workflow.

mod assembler;
mod request;
mod reservation;
mod service;

pub use assembler::{PlacedOrder, assemble_order};
pub use request::{
    LineItem, LineItemRequest, OrderRequest, Quantity, ValidatedOrder, ValidationError,
};
pub use reservation::{Reservation, ReservedLine, reserve_items};
pub use service::OrderService;
