//! User lookup endpoint.

use axum::Json;
use axum::extract::{Path, State};
use common::UserId;
use store::{Store, User};

use super::SharedState;
use crate::error::ApiError;

/// GET /users/{id} — fetch a single user.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<SharedState<S>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user_id: UserId = id
        .parse()
        .map_err(|e: common::IdParseError| ApiError::BadRequest(e.to_string()))?;

    state
        .store
        .get_user(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
