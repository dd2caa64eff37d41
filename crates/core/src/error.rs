//! Catalog error model.
//!
//! Repositories classify every storage outcome into this closed set. Domain
//! services pass it through unchanged; the HTTP boundary maps it to status codes.

use thiserror::Error;

/// Result type used across the catalog layers.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog-level error.
///
/// `NotFound` and `AlreadyExists` are expected outcomes. The `*Failure` variants
/// are unexpected storage failures; they carry the resource and the underlying
/// message so the point of detection can log them with context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A single-row lookup matched nothing.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// A uniqueness constraint rejected the write (duplicate code).
    #[error("{resource} already exists")]
    AlreadyExists { resource: &'static str },

    /// The count phase of a list query failed.
    #[error("failed to count {resource}: {message}")]
    CountFailure {
        resource: &'static str,
        message: String,
    },

    /// The select phase of a list query, or a single-row fetch, failed.
    #[error("failed to fetch {resource}: {message}")]
    FetchFailure {
        resource: &'static str,
        message: String,
    },

    /// An insert failed for a reason other than a uniqueness conflict.
    #[error("failed to create {resource}: {message}")]
    CreateFailure {
        resource: &'static str,
        message: String,
    },

    /// A batch create was called with no elements.
    #[error("empty {resource} input list")]
    EmptyBatchInput { resource: &'static str },
}

/// Bare error kind, without payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    CountFailure,
    FetchFailure,
    CreateFailure,
    EmptyBatchInput,
}

impl ErrorKind {
    /// Stable snake_case identifier (used in error bodies and log fields).
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::CountFailure => "count_failure",
            ErrorKind::FetchFailure => "fetch_failure",
            ErrorKind::CreateFailure => "create_failure",
            ErrorKind::EmptyBatchInput => "empty_batch_input",
        }
    }
}

impl CatalogError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn already_exists(resource: &'static str) -> Self {
        Self::AlreadyExists { resource }
    }

    pub fn count(resource: &'static str, message: impl Into<String>) -> Self {
        Self::CountFailure {
            resource,
            message: message.into(),
        }
    }

    pub fn fetch(resource: &'static str, message: impl Into<String>) -> Self {
        Self::FetchFailure {
            resource,
            message: message.into(),
        }
    }

    pub fn create(resource: &'static str, message: impl Into<String>) -> Self {
        Self::CreateFailure {
            resource,
            message: message.into(),
        }
    }

    pub fn empty_batch(resource: &'static str) -> Self {
        Self::EmptyBatchInput { resource }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            CatalogError::CountFailure { .. } => ErrorKind::CountFailure,
            CatalogError::FetchFailure { .. } => ErrorKind::FetchFailure,
            CatalogError::CreateFailure { .. } => ErrorKind::CreateFailure,
            CatalogError::EmptyBatchInput { .. } => ErrorKind::EmptyBatchInput,
        }
    }
}
