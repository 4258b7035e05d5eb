//! HTTP API server for the order service.
//!
//! Provides the order-placement endpoint plus user, product and order
//! reads, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use domain::OrderService;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::{AppState, SharedState};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: SharedState<S>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users/{id}", get(routes::users::get::<S>))
        .route("/products", get(routes::products::list::<S>))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a store.
///
/// `order_timeout` bounds each order placement; a placement that runs
/// past it is rolled back.
pub fn create_state<S: Store + Clone + 'static>(
    store: S,
    order_timeout: Option<Duration>,
) -> SharedState<S> {
    let order_service = OrderService::new(store.clone());
    let order_service = match order_timeout {
        Some(timeout) => order_service.with_timeout(timeout),
        None => order_service,
    };

    Arc::new(AppState {
        order_service,
        store,
    })
}
