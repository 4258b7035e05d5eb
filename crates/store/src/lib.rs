//! Transactional storage for users, products, and orders.
//!
//! The [`Store`] trait hands out [`StoreSession`]s, each a pooled
//! connection with an open transaction. [`TransactionScope`] wraps a
//! session so that it is committed or rolled back exactly once.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod records;
pub mod scope;
pub mod store;

pub use common::{OrderId, ProductId, UserId};
pub use error::{Result, StoreError};
pub use memory::{InMemorySession, InMemoryStore, NewProduct};
pub use postgres::{PoolSettings, PostgresSession, PostgresStore};
pub use query::ProductQuery;
pub use records::{
    InsertedOrder, NewOrder, NewOrderItem, OrderDetailItem, OrderDetails, OrderStatus, Product,
    ProductPage, StockReservation, User,
};
pub use scope::TransactionScope;
pub use store::{Store, StoreSession};
