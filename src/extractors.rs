use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Numeric `:id` path segment. Anything that is not an `i64` is a 400.
pub struct IdPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest("missing id".into()))?;
        raw.trim()
            .parse::<i64>()
            .map(IdPath)
            .map_err(|_| ApiError::BadRequest("id must be an integer".into()))
    }
}

/// JSON body decoded regardless of `Content-Type`; decode failures come back
/// as the standard error envelope with serde's reason attached.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rej| {
            tracing::debug!(reason = %rej.body_text(), "request body unreadable");
            ApiError::BadRequest("could not read request body".into())
        })?;
        serde_json::from_slice::<T>(&bytes)
            .map(JsonBody)
            .map_err(|e| {
                tracing::debug!(error = %e, "json body rejected");
                ApiError::BadRequest(format!("invalid JSON body: {e}"))
            })
    }
}
