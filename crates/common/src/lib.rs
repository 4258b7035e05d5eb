//! Shared types for the order service.

mod types;

pub use types::{IdParseError, OrderId, ProductId, UserId};
