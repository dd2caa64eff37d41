//! Process configuration read from the environment.

use std::net::SocketAddr;

use catalog_infra::db::{ConfigError, DatabaseConfig};
use catalog_infra::repository::ReadConsistency;

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Which repositories back the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Seeded in-memory tables; nothing survives a restart.
    InMemory,
    Postgres(DatabaseConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub backend: StoreBackend,
    pub read_consistency: ReadConsistency,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = raw_addr.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            name: "HTTP_ADDR",
            value: raw_addr.clone(),
        })?;

        let use_persistent = lookup("USE_PERSISTENT_STORES")
            .unwrap_or_else(|| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let backend = if use_persistent {
            StoreBackend::Postgres(DatabaseConfig::from_lookup(&lookup)?)
        } else {
            StoreBackend::InMemory
        };

        let read_consistency = match lookup("CATALOG_READ_CONSISTENCY") {
            Some(raw) => raw.parse()?,
            None => ReadConsistency::default(),
        };

        Ok(Self {
            http_addr,
            backend,
            read_consistency,
        })
    }
}
