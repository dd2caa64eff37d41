use axum::Router;

pub mod catalog;
pub mod categories;
pub mod system;

/// Router for every catalog endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/catalog", catalog::router())
        .nest("/categories", categories::router())
}
