use std::sync::Arc;

use thiserror::Error;

use catalog_core::CatalogError;
use catalog_infra::repository::{InMemoryCatalogStore, PostgresCategoryStore, PostgresProductStore};
use catalog_observability::TracingLogger;
use catalog_products::{CatalogService, CategoryService, CategoryStore, ProductStore};

use crate::config::{AppConfig, StoreBackend};

/// Failure while wiring the services at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to connect to postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to load seed catalog: {0}")]
    Seed(#[from] CatalogError),
}

/// Domain services shared by every handler.
pub struct AppServices {
    pub catalog: CatalogService<Arc<dyn ProductStore>>,
    pub categories: CategoryService<Arc<dyn CategoryStore>>,
}

impl AppServices {
    pub fn new(products: Arc<dyn ProductStore>, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            catalog: CatalogService::new(products, TracingLogger::shared("catalog_service")),
            categories: CategoryService::new(categories, TracingLogger::shared("category_service")),
        }
    }

    /// Both ports served by one seeded in-memory store.
    pub fn in_memory_seeded() -> Result<Self, StartupError> {
        let store = Arc::new(InMemoryCatalogStore::seeded(TracingLogger::shared(
            "in_memory_repository",
        ))?);
        Ok(Self::new(store.clone(), store))
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    match &config.backend {
        StoreBackend::InMemory => {
            tracing::warn!("USE_PERSISTENT_STORES not set; serving the seeded in-memory catalog");
            AppServices::in_memory_seeded()
        }
        StoreBackend::Postgres(db) => {
            let pool = db.connect().await?;
            tracing::info!(
                max_connections = db.max_connections,
                consistency = ?config.read_consistency,
                "connected to postgres"
            );

            let products = PostgresProductStore::new(
                pool.clone(),
                TracingLogger::shared("product_repository"),
            )
            .with_consistency(config.read_consistency);
            let categories =
                PostgresCategoryStore::new(pool, TracingLogger::shared("category_repository"));

            Ok(AppServices::new(Arc::new(products), Arc::new(categories)))
        }
    }
}
