//! View-ready values returned by the domain services.
//!
//! Prices stay exact `Decimal`s here; they become JSON numbers only when
//! serialized.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::Page;

use crate::category::Category;
use crate::product::{Product, Variant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub category: String,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            category: p.category.code.clone(),
            code: p.code.clone(),
            price: p.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantView {
    pub name: String,
    pub sku: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl VariantView {
    /// `price` is the already resolved effective price.
    pub fn new(variant: &Variant, price: Decimal) -> Self {
        Self {
            name: variant.name.clone(),
            sku: variant.sku.clone(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetailView {
    pub category: String,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub variants: Vec<VariantView>,
}

impl From<&Product> for ProductDetailView {
    fn from(p: &Product) -> Self {
        Self {
            category: p.category.code.clone(),
            code: p.code.clone(),
            price: p.price,
            variants: p
                .priced_variants()
                .map(|(v, price)| VariantView::new(v, price))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<ProductView>,
    pub total: u64,
}

impl From<Page<Product>> for ProductPage {
    fn from(page: Page<Product>) -> Self {
        let page = page.map(|p| ProductView::from(&p));
        Self {
            products: page.items,
            total: page.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub code: String,
    pub name: String,
}

impl From<&Category> for CategoryView {
    fn from(c: &Category) -> Self {
        Self {
            code: c.code.clone(),
            name: c.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPage {
    pub categories: Vec<CategoryView>,
    pub total: u64,
}

impl From<Page<Category>> for CategoryPage {
    fn from(page: Page<Category>) -> Self {
        let page = page.map(|c| CategoryView::from(&c));
        Self {
            categories: page.items,
            total: page.total,
        }
    }
}
