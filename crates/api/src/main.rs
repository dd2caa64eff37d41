use std::sync::Arc;

use catalog_api::app::{build_app, services::build_services};
use catalog_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = AppConfig::from_env()?;
    let services = Arc::new(build_services(&config).await?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
