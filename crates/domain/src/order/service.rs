//! Order placement service.

use std::time::{Duration, Instant};

use store::{Store, TransactionScope};

use crate::error::OrderError;

use super::{OrderRequest, PlacedOrder, ValidatedOrder, assemble_order, reserve_items};

/// Places orders as single all-or-nothing units of work.
///
/// Each call validates the request, borrows one session from the store,
/// reserves stock for every item, writes the order and its items, and
/// commits. Any failure rolls the whole unit back, so stock is never
/// decremented without a matching order and no order is left without
/// all of its items.
pub struct OrderService<S: Store> {
    store: S,
    timeout: Option<Duration>,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            timeout: None,
        }
    }

    /// Bounds how long one placement may take, session acquisition included.
    ///
    /// A placement that runs past the deadline is abandoned and its
    /// transaction rolled back.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and places an order.
    #[tracing::instrument(skip(self, request))]
    pub async fn place_order(&self, request: OrderRequest) -> Result<PlacedOrder, OrderError> {
        let started = Instant::now();

        let result = match request.validate() {
            Ok(order) => self.place_validated(&order).await,
            Err(e) => Err(OrderError::Validation(e)),
        };

        metrics::histogram!("order_placement_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        match &result {
            Ok(placed) => {
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(
                    order_id = %placed.order_id,
                    user_id = %placed.user_id,
                    total = %placed.total_amount,
                    items = placed.lines.len(),
                    "order placed"
                );
            }
            Err(e) => {
                metrics::counter!("orders_rejected_total", "reason" => e.reason()).increment(1);
                if e.is_client_error() {
                    tracing::info!(error = %e, "order rejected");
                } else {
                    tracing::error!(error = %e, "order placement failed");
                }
            }
        }

        result
    }

    /// Places an order that has already passed validation.
    pub async fn place_validated(&self, order: &ValidatedOrder) -> Result<PlacedOrder, OrderError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_atomically(order))
                .await
                .map_err(|_| OrderError::TimedOut)?,
            None => self.run_atomically(order).await,
        }
    }

    async fn run_atomically(&self, order: &ValidatedOrder) -> Result<PlacedOrder, OrderError> {
        let mut scope = TransactionScope::begin(&self.store).await?;
        let outcome = Self::run_stages(scope.session(), order).await;
        scope.finish(outcome).await
    }

    async fn run_stages(
        session: &mut S::Session,
        order: &ValidatedOrder,
    ) -> Result<PlacedOrder, OrderError> {
        let reservation = reserve_items(session, order).await?;
        assemble_order(session, order.user_id(), reservation).await
    }
}

impl<S: Store + Clone> Clone for OrderService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
        }
    }
}
