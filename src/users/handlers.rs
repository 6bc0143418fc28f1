use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{User, UserRequest};
use crate::{
    error::{ApiError, ApiResponse},
    extractors::{IdPath, JsonBody},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user).put(update_user))
}

#[instrument(skip(state, req))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UserRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    let id = state.users.create_user(&req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::created(id))))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.get_user(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

#[instrument(skip(state, req))]
pub async fn update_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<UserRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.users.update_user(id, &req).await?;
    Ok(Json(ApiResponse::status("updated")))
}
