//! Inventory reservation for the items of one order.

use common::ProductId;
use store::{StockReservation, StoreSession};

use crate::error::OrderError;
use crate::money::Money;

use super::{Quantity, ValidatedOrder};

/// A line item whose stock has been reserved, with the unit price frozen
/// at the moment of reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub price_at_purchase: Money,
}

impl ReservedLine {
    pub fn line_total(&self) -> Money {
        self.price_at_purchase.multiply(self.quantity)
    }
}

/// Stock reserved for every item of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    lines: Vec<ReservedLine>,
    total: Money,
}

impl Reservation {
    /// Reserved lines in request order.
    pub fn lines(&self) -> &[ReservedLine] {
        &self.lines
    }

    /// Sum of `price_at_purchase × quantity` over all lines.
    pub fn total(&self) -> Money {
        self.total
    }
}

/// Reserves stock for each item of `order`, in request order.
///
/// Stops at the first item that cannot be reserved. Stock already taken
/// for earlier items stays decremented inside `session`; the caller is
/// expected to roll the session back.
#[tracing::instrument(skip(session, order), fields(user_id = %order.user_id(), items = order.items().len()))]
pub async fn reserve_items<S: StoreSession>(
    session: &mut S,
    order: &ValidatedOrder,
) -> Result<Reservation, OrderError> {
    let mut lines = Vec::with_capacity(order.items().len());
    let mut total = Money::zero();

    for item in order.items() {
        let quantity = item.quantity.get();
        match session.reserve_stock(item.product_id, quantity).await? {
            StockReservation::Reserved { unit_price } => {
                let line = ReservedLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price_at_purchase: Money::new(unit_price),
                };
                total += line.line_total();
                metrics::counter!("stock_reservations_total").increment(1);
                tracing::debug!(product_id = %item.product_id, quantity, "stock reserved");
                lines.push(line);
            }
            StockReservation::NotFound => {
                tracing::info!(product_id = %item.product_id, "product not found");
                return Err(OrderError::ProductNotFound(item.product_id));
            }
            StockReservation::Insufficient { available } => {
                tracing::info!(
                    product_id = %item.product_id,
                    requested = quantity,
                    available,
                    "insufficient stock"
                );
                return Err(OrderError::InsufficientStock {
                    product_id: item.product_id,
                    requested: quantity,
                    available,
                });
            }
        }
    }

    Ok(Reservation { lines, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderRequest;
    use common::UserId;
    use store::{InMemoryStore, NewProduct, Store};

    fn dec(s: &str) -> rust_decimal::Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_total_is_sum_of_line_totals() {
        let store = InMemoryStore::new();
        let a = store.insert_product(NewProduct::new("A", dec("10.00"), 5)).await;
        let b = store.insert_product(NewProduct::new("B", dec("0.35"), 9)).await;
        let order = OrderRequest::new(UserId::new(1), [(a, 2), (b, 3)])
            .validate()
            .unwrap();

        let mut session = store.begin().await.unwrap();
        let reservation = reserve_items(&mut session, &order).await.unwrap();

        assert_eq!(reservation.total(), Money::new(dec("21.05")));
        assert_eq!(reservation.lines().len(), 2);
        assert_eq!(reservation.lines()[1].price_at_purchase, Money::new(dec("0.35")));
        let summed: Money = reservation.lines().iter().map(ReservedLine::line_total).sum();
        assert_eq!(summed, reservation.total());
    }

    #[tokio::test]
    async fn test_stops_at_first_missing_product() {
        let store = InMemoryStore::new();
        let a = store.insert_product(NewProduct::new("A", dec("1.00"), 5)).await;
        let missing = common::ProductId::new(999);
        let order = OrderRequest::new(UserId::new(1), [(a, 1), (missing, 1), (a, 100)])
            .validate()
            .unwrap();

        let mut session = store.begin().await.unwrap();
        let err = reserve_items(&mut session, &order).await.unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_reports_insufficient_stock_with_counts() {
        let store = InMemoryStore::new();
        let a = store.insert_product(NewProduct::new("A", dec("1.00"), 2)).await;
        let order = OrderRequest::new(UserId::new(1), [(a, 1), (a, 2)])
            .validate()
            .unwrap();

        let mut session = store.begin().await.unwrap();
        let err = reserve_items(&mut session, &order).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InsufficientStock { product_id, requested: 2, available: 1 } if product_id == a
        ));
    }
}
