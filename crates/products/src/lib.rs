//! Catalog domain module.
//!
//! Entities, price inheritance, the storage ports implemented by `catalog-infra`,
//! and the two domain services that turn repository results into view-ready
//! values. No SQL, no HTTP.

pub mod catalog;
pub mod categories;
pub mod category;
pub mod pricing;
pub mod product;
pub mod store;
pub mod view;

pub use catalog::CatalogService;
pub use categories::CategoryService;
pub use category::{Category, CreateCategoryInput};
pub use pricing::resolve_variant_price;
pub use product::{Product, Variant};
pub use store::{CategoryStore, ProductFilter, ProductStore};
pub use view::{CategoryPage, CategoryView, ProductDetailView, ProductPage, ProductView, VariantView};
