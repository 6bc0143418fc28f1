use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{Anquette, AnquetteRequest};
use crate::{
    error::{ApiError, ApiResponse},
    extractors::{IdPath, JsonBody},
    state::AppState,
};

pub fn anquette_routes() -> Router<AppState> {
    Router::new()
        .route("/anquettes", post(create_anquette))
        .route(
            "/anquettes/:id",
            get(get_anquette).put(update_anquette).delete(delete_anquette),
        )
}

#[instrument(skip(state, req))]
pub async fn create_anquette(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnquetteRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    let id = state.anquettes.create_anquette(&req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::created(id))))
}

#[instrument(skip(state))]
pub async fn get_anquette(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<Anquette>>, ApiError> {
    let anquette = state.anquettes.get_anquette(id).await?;
    Ok(Json(ApiResponse::ok(anquette)))
}

#[instrument(skip(state, req))]
pub async fn update_anquette(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<AnquetteRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.anquettes.update_anquette(id, &req).await?;
    Ok(Json(ApiResponse::status("updated")))
}

#[instrument(skip(state))]
pub async fn delete_anquette(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse>, ApiError> {
    state.anquettes.delete_anquette(id).await?;
    Ok(Json(ApiResponse::status("deleted")))
}
