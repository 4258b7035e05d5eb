//! Order placement and order detail endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, ProductId};
use domain::{Money, OrderRequest};
use serde::Serialize;
use store::Store;

use super::SharedState;
use crate::error::ApiError;

// -- Response types --

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: OrderId,
    pub total_amount: Money,
    pub status: String,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct OrderDetailsResponse {
    pub order_id: OrderId,
    pub total_amount: Money,
    pub status: String,
    pub order_date: String,
    pub username: String,
    pub email: String,
    pub items: Vec<OrderDetailItemResponse>,
}

#[derive(Serialize)]
pub struct OrderDetailItemResponse {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub price: Money,
}

// -- Handlers --

/// POST /orders — place an order, reserving stock for every item.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<SharedState<S>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    let Json(request) = payload?;
    let placed = state.order_service.place_order(request).await?;

    let response = OrderCreatedResponse {
        order_id: placed.order_id,
        total_amount: placed.total_amount,
        status: placed.status.to_string(),
        message: "Order created successfully",
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /orders/{id} — load an order with its owner and line items.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<SharedState<S>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailsResponse>, ApiError> {
    let order_id: OrderId = id
        .parse()
        .map_err(|e: common::IdParseError| ApiError::BadRequest(e.to_string()))?;

    let details = state
        .store
        .get_order_details(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    let items = details
        .items
        .into_iter()
        .map(|item| OrderDetailItemResponse {
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: Money::new(item.price),
        })
        .collect();

    Ok(Json(OrderDetailsResponse {
        order_id: details.order_id,
        total_amount: Money::new(details.total_amount),
        status: details.status,
        order_date: details.order_date.to_rfc3339(),
        username: details.username,
        email: details.email,
        items,
    }))
}
