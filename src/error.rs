//! Domain errors and their HTTP translation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Storage `NotFound` becomes a domain `NotFound` for `resource`;
    /// everything else is internal.
    pub fn from_store(resource: &'static str, context: &'static str, e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::NotFound(resource),
            source => Self::Internal { context, source },
        }
    }
}

/// JSON envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T = serde_json::Value> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn status(status: &str) -> Self {
        Self {
            status: status.into(),
            id: None,
            data: None,
            error: None,
        }
    }

    pub fn created(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::status("created")
        }
    }

    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::status("ok")
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::status("error")
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Request could not be decoded (body or path); the service is never called.
    BadRequest(String),
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::ValidationFailed(_)) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Service(ServiceError::Internal { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Service(ServiceError::Internal { .. }) => "internal server error".into(),
            Self::Service(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Service(ServiceError::Internal { context, source }) => {
                error!(error = %source, %context, "request failed");
            }
            Self::Service(e) => warn!(error = %e, "request rejected"),
            Self::BadRequest(msg) => warn!(%msg, "bad request"),
        }
        (status, Json(ApiResponse::<()>::error(self.message()))).into_response()
    }
}
