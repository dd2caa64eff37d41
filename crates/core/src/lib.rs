//! Shared vocabulary for the catalog service.
//!
//! Pure building blocks only: the closed error set produced by repositories,
//! typed identifiers, and the pagination/page types. No storage or HTTP concerns.

pub mod error;
pub mod id;
pub mod page;

pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use id::{CategoryId, ProductId, VariantId};
pub use page::{Page, Pagination};
