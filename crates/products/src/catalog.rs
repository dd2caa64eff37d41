//! Catalog Domain Service: product pages and product details.

use catalog_core::{CatalogResult, Pagination};
use catalog_observability::SharedLogger;

use crate::store::{ProductFilter, ProductStore};
use crate::view::{ProductDetailView, ProductPage};

/// Orchestrates the product repository and the price resolver into views.
///
/// Errors from the store are returned unchanged; the store already logged
/// storage failures where they happened.
#[derive(Debug)]
pub struct CatalogService<S> {
    store: S,
    log: SharedLogger,
}

impl<S> CatalogService<S>
where
    S: ProductStore,
{
    pub fn new(store: S, log: SharedLogger) -> Self {
        Self { store, log }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn list_products(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> CatalogResult<ProductPage> {
        self.log.debug(
            "list products",
            &[
                ("limit", pagination.limit.to_string()),
                ("offset", pagination.offset.to_string()),
                ("category_code", filter.category_code.clone().unwrap_or_default()),
                (
                    "max_price",
                    filter.max_price.map(|p| p.to_string()).unwrap_or_default(),
                ),
            ],
        );

        let page = self.store.list_products(pagination, filter).await?;
        Ok(ProductPage::from(page))
    }

    pub async fn detail_product(&self, code: &str) -> CatalogResult<ProductDetailView> {
        self.log.debug("detail product", &[("code", code.to_string())]);

        let product = self.store.get_by_code(code).await?;
        Ok(ProductDetailView::from(&product))
    }
}
