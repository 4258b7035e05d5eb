use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};

use crate::{
    InsertedOrder, NewOrder, NewOrderItem, OrderDetails, ProductPage, ProductQuery, Result,
    StockReservation, User,
};

/// A database session with an open transaction.
///
/// A session is borrowed from the store's pool by [`Store::begin`] and is
/// exclusively owned by one task until it is committed, rolled back, or
/// dropped. Dropping a session without committing discards every change
/// made through it and returns the connection to the pool.
#[async_trait]
pub trait StoreSession: Send {
    /// Decrements a product's stock by `quantity` if, and only if, the
    /// product currently holds at least that many units.
    ///
    /// The check and the decrement are a single atomic step with respect
    /// to other sessions reserving the same product. On success the
    /// product's `updated_at` is refreshed and its unit price is returned.
    async fn reserve_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<StockReservation>;

    /// Inserts an order header and returns its assigned identity.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<InsertedOrder>;

    /// Inserts one line item belonging to `order_id`.
    async fn insert_order_item(&mut self, order_id: OrderId, item: &NewOrderItem) -> Result<()>;

    /// Makes every change in this session visible to other sessions.
    async fn commit(self) -> Result<()>;

    /// Discards every change made in this session.
    async fn rollback(self) -> Result<()>;
}

/// Core trait for store implementations.
///
/// All implementations must be thread-safe (Send + Sync); one store is
/// shared by every request handler.
#[async_trait]
pub trait Store: Send + Sync {
    type Session: StoreSession + 'static;

    /// Acquires a session from the pool and begins a transaction.
    ///
    /// Waits for a free session when the pool is exhausted.
    async fn begin(&self) -> Result<Self::Session>;

    /// Looks up a single user.
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>>;

    /// Lists products, newest first.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage>;

    /// Loads an order with its owner and line items.
    async fn get_order_details(&self, order_id: OrderId) -> Result<Option<OrderDetails>>;
}
