//! Storage ports for the catalog.
//!
//! `catalog-infra` provides Postgres and in-memory implementations. Every method
//! returns a value from the closed [`CatalogError`](catalog_core::CatalogError)
//! set; implementations classify and log storage failures at the point of
//! detection.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{CatalogResult, Page, Pagination};

use crate::category::{Category, CreateCategoryInput};
use crate::product::Product;

/// Fixed product list predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Exact match on the joined category's code.
    pub category_code: Option<String>,
    /// Strict upper bound: only products with `price < max_price`.
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty code means "no category filter".
    pub fn with_category_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.category_code = if code.is_empty() { None } else { Some(code) };
        self
    }

    pub fn with_max_price(mut self, max_price: Option<Decimal>) -> Self {
        self.max_price = max_price;
        self
    }

    /// Evaluate the predicates against a row's category code and price.
    pub fn matches(&self, category_code: &str, price: Decimal) -> bool {
        let category_ok = self
            .category_code
            .as_deref()
            .map_or(true, |wanted| wanted == category_code);
        let price_ok = self.max_price.map_or(true, |max| price < max);
        category_ok && price_ok
    }
}

/// Product Query Repository.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Filtered page of products, ordered by price descending then code
    /// ascending, with category and variants loaded.
    ///
    /// `total` comes from a separate count over the same predicates. A count
    /// failure is reported as `CountFailure`, a select failure as `FetchFailure`.
    async fn list_products(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> CatalogResult<Page<Product>>;

    /// Single product by exact code, with category and variants loaded.
    ///
    /// A missing row is `NotFound`; any other failure is `FetchFailure`.
    async fn get_by_code(&self, code: &str) -> CatalogResult<Product>;
}

/// Category Query Repository.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Page of categories ordered by code ascending, optionally restricted to
    /// one exact code.
    async fn list_categories(
        &self,
        pagination: Pagination,
        category_code: Option<&str>,
    ) -> CatalogResult<Page<Category>>;

    /// Insert one category and return the persisted row.
    ///
    /// A duplicate code is `AlreadyExists`; other failures are `CreateFailure`.
    async fn create_category(&self, code: &str, name: &str) -> CatalogResult<Category>;

    /// Insert all categories atomically: either every row is committed or none.
    ///
    /// Empty input is `EmptyBatchInput` (storage untouched). Any duplicate code,
    /// against existing rows or within the batch, is `AlreadyExists`.
    async fn create_categories(&self, inputs: &[CreateCategoryInput]) -> CatalogResult<()>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn list_products(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> CatalogResult<Page<Product>> {
        (**self).list_products(pagination, filter).await
    }

    async fn get_by_code(&self, code: &str) -> CatalogResult<Product> {
        (**self).get_by_code(code).await
    }
}

#[async_trait]
impl<S> CategoryStore for Arc<S>
where
    S: CategoryStore + ?Sized,
{
    async fn list_categories(
        &self,
        pagination: Pagination,
        category_code: Option<&str>,
    ) -> CatalogResult<Page<Category>> {
        (**self).list_categories(pagination, category_code).await
    }

    async fn create_category(&self, code: &str, name: &str) -> CatalogResult<Category> {
        (**self).create_category(code, name).await
    }

    async fn create_categories(&self, inputs: &[CreateCategoryInput]) -> CatalogResult<()> {
        (**self).create_categories(inputs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_category_code_disables_the_filter() {
        let filter = ProductFilter::new().with_category_code("");
        assert_eq!(filter.category_code, None);
        assert!(filter.matches("ANYTHING", dec!(1.00)));
    }

    #[test]
    fn max_price_is_a_strict_bound() {
        let filter = ProductFilter::new().with_max_price(Some(dec!(10.99)));
        assert!(!filter.matches("CLOTHING", dec!(10.99)));
        assert!(filter.matches("CLOTHING", dec!(10.98)));
    }

    #[test]
    fn both_predicates_must_hold() {
        let filter = ProductFilter::new()
            .with_category_code("CLOTHING")
            .with_max_price(Some(dec!(18.00)));
        assert!(filter.matches("CLOTHING", dec!(15.00)));
        assert!(!filter.matches("SHOES", dec!(15.00)));
        assert!(!filter.matches("CLOTHING", dec!(18.20)));
    }
}
