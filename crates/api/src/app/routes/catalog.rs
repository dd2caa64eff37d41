use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:code", get(get_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    let (pagination, filter) = match query.into_parts() {
        Ok(parts) => parts,
        Err(e) => return e.into_response(),
    };

    match services.catalog.list_products(pagination, &filter).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    if let Err(e) = dto::validate_product_code(&code) {
        return e.into_response();
    }

    match services.catalog.detail_product(&code).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
