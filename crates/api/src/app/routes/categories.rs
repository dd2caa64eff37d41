use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(list_categories).post(create_categories))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListCategoriesQuery>,
) -> axum::response::Response {
    let (pagination, category_code) = match query.into_parts() {
        Ok(parts) => parts,
        Err(e) => return e.into_response(),
    };

    match services
        .categories
        .list_categories(pagination, &category_code)
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// One element goes through the single-create path and echoes the row;
/// anything else is an all-or-nothing batch.
pub async fn create_categories(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::OneOrMany<dto::CreateCategoryRequest>>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiError::InvalidBody(rejection.body_text()).into_response(),
    };

    let inputs = match dto::validate_categories(body.into_vec()) {
        Ok(inputs) => inputs,
        Err(e) => return e.into_response(),
    };

    if let [single] = inputs.as_slice() {
        return match services
            .categories
            .create_category(&single.code, &single.name)
            .await
        {
            Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
            Err(e) => errors::catalog_error_to_response(e),
        };
    }

    match services.categories.create_categories(&inputs).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "created": inputs.len() })),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
