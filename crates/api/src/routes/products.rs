//! Product listing endpoint.

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use store::{Product, ProductQuery, Store};

use super::SharedState;
use crate::error::ApiError;

/// Raw query string values. Unparseable numbers fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
}

impl ListParams {
    fn into_query(self) -> ProductQuery {
        let number = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok());
        ProductQuery::from_params(number(self.page), number(self.limit), self.category)
    }
}

#[derive(Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

/// GET /products — paginated listing, optionally filtered by category.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<SharedState<S>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let query = params.into_query();
    let page = state.store.list_products(&query).await?;

    Ok(Json(ProductListResponse {
        products: page.products,
        pagination: Pagination {
            page: query.page_number(),
            limit: query.page_size(),
            total: page.total,
        },
    }))
}
