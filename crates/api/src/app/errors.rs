use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use catalog_core::CatalogError;

/// Request rejected before reaching a domain service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{field} must be {expected}")]
    InvalidParam {
        field: &'static str,
        expected: &'static str,
    },

    #[error("invalid product code {0:?}: expected PROD followed by three digits")]
    InvalidProductCode(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        json_error(StatusCode::BAD_REQUEST, "validation_error", self.to_string())
    }
}

/// Storage failure details stay in the logs; the client gets the phase only.
pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    let code = err.kind().as_str();
    match err {
        CatalogError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, code, err.to_string()),
        CatalogError::AlreadyExists { .. } => json_error(StatusCode::CONFLICT, code, err.to_string()),
        CatalogError::EmptyBatchInput { .. } => {
            json_error(StatusCode::BAD_REQUEST, code, err.to_string())
        }
        CatalogError::CountFailure { resource, .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            code,
            format!("failed to count {resource}"),
        ),
        CatalogError::FetchFailure { resource, .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            code,
            format!("failed to fetch {resource}"),
        ),
        CatalogError::CreateFailure { resource, .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            code,
            format!("failed to create {resource}"),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
