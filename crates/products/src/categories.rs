//! Category Domain Service.

use catalog_core::{CatalogResult, Pagination};
use catalog_observability::SharedLogger;

use crate::category::CreateCategoryInput;
use crate::store::CategoryStore;
use crate::view::{CategoryPage, CategoryView};

/// Thin orchestration over the category repository.
#[derive(Debug)]
pub struct CategoryService<S> {
    store: S,
    log: SharedLogger,
}

impl<S> CategoryService<S>
where
    S: CategoryStore,
{
    pub fn new(store: S, log: SharedLogger) -> Self {
        Self { store, log }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// An empty `category_code` lists every category.
    pub async fn list_categories(
        &self,
        pagination: Pagination,
        category_code: &str,
    ) -> CatalogResult<CategoryPage> {
        let code = (!category_code.is_empty()).then_some(category_code);
        let page = self.store.list_categories(pagination, code).await?;
        Ok(CategoryPage::from(page))
    }

    pub async fn create_category(&self, code: &str, name: &str) -> CatalogResult<CategoryView> {
        self.log.debug(
            "create category",
            &[("code", code.to_string()), ("name", name.to_string())],
        );

        let created = self.store.create_category(code, name).await?;
        Ok(CategoryView::from(&created))
    }

    pub async fn create_categories(&self, inputs: &[CreateCategoryInput]) -> CatalogResult<()> {
        self.log
            .debug("create categories", &[("count", inputs.len().to_string())]);

        self.store.create_categories(inputs).await
    }
}
