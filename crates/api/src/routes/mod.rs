//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod users;

use std::sync::Arc;

use domain::OrderService;
use store::Store;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub order_service: OrderService<S>,
    pub store: S,
}

/// State handle passed to handlers.
pub type SharedState<S> = Arc<AppState<S>>;
