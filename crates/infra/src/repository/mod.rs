//! Catalog repositories.
//!
//! Two backends implement the storage ports of `catalog-products`:
//! - `postgres`: sqlx over a shared `PgPool` (production),
//! - `in_memory`: `RwLock`-guarded tables with the same constraints (tests/dev).
//!
//! Both classify every storage outcome into `CatalogError` and log failures
//! through the injected `SharedLogger`.

use core::str::FromStr;

use crate::db::ConfigError;

pub mod categories;
pub mod in_memory;
pub mod products;
pub mod seed;
mod sqlx_errors;

pub use categories::PostgresCategoryStore;
pub use in_memory::{InMemoryCatalogStore, StorageOp};
pub use products::PostgresProductStore;

/// How the count and select phases of a list call relate.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ReadConsistency {
    /// Two independent statements. A concurrent write between them can make
    /// `total` disagree with the returned page.
    #[default]
    Independent,
    /// Both statements inside one `REPEATABLE READ, READ ONLY` transaction.
    Snapshot,
}

impl FromStr for ReadConsistency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(ReadConsistency::Independent),
            "snapshot" => Ok(ReadConsistency::Snapshot),
            _ => Err(ConfigError::Invalid {
                name: "CATALOG_READ_CONSISTENCY",
                value: s.to_string(),
            }),
        }
    }
}
