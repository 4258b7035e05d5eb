//! Persistence of an order header and its line items.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use store::{NewOrder, NewOrderItem, OrderStatus, StoreSession};

use crate::error::OrderError;
use crate::money::Money;

use super::{Reservation, ReservedLine};

/// An order written by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<ReservedLine>,
}

/// Inserts the order header with status `pending`, then one item row per
/// reserved line carrying its frozen price.
#[tracing::instrument(skip(session, reservation), fields(total = %reservation.total()))]
pub async fn assemble_order<S: StoreSession>(
    session: &mut S,
    user_id: UserId,
    reservation: Reservation,
) -> Result<PlacedOrder, OrderError> {
    let status = OrderStatus::Pending;
    let total_amount = reservation.total();

    let inserted = session
        .insert_order(&NewOrder {
            user_id,
            total_amount: total_amount.amount(),
            status,
        })
        .await?;

    for line in reservation.lines() {
        session
            .insert_order_item(
                inserted.id,
                &NewOrderItem {
                    product_id: line.product_id,
                    quantity: line.quantity.get(),
                    price_at_purchase: line.price_at_purchase.amount(),
                },
            )
            .await?;
    }

    tracing::debug!(order_id = %inserted.id, "order rows written");

    Ok(PlacedOrder {
        order_id: inserted.id,
        total_amount,
        status,
        user_id,
        created_at: inserted.created_at,
        lines: reservation.lines().to_vec(),
    })
}
