//! SQLx error inspection shared by the Postgres repositories.
//!
//! The repositories turn `sqlx::Error` into `CatalogError` by phase:
//!
//! | SQLx Error | PostgreSQL Error Code | CatalogError | Scenario |
//! |------------|----------------------|--------------|----------|
//! | Database (unique violation) | `23505` | `AlreadyExists` | Duplicate category code on insert |
//! | Database (other) | Any other | `CountFailure` / `FetchFailure` / `CreateFailure` | Depends on the failing phase |
//! | PoolTimedOut / PoolClosed | N/A | phase failure | No connection could be borrowed |
//! | Other | N/A | phase failure | Network errors, decode errors, etc. |
//!
//! A missing row is never an error here: single-row lookups use
//! `fetch_optional` and report `NotFound` themselves.

/// SQLSTATE for `unique_violation`.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";

/// Human-readable description of a failure, prefixed with the operation.
pub(crate) fn describe(operation: &str, err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => format!(
                "database error in {} ({}): {}",
                operation,
                code,
                db_err.message()
            ),
            None => format!("database error in {}: {}", operation, db_err.message()),
        },
        sqlx::Error::PoolTimedOut => {
            format!("timed out acquiring a connection in {}", operation)
        }
        sqlx::Error::PoolClosed => format!("connection pool closed in {}", operation),
        _ => format!("sqlx error in {}: {}", operation, err),
    }
}

/// Check if an error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == UNIQUE_VIOLATION;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_name_the_operation() {
        assert_eq!(
            describe("count_products", &sqlx::Error::PoolTimedOut),
            "timed out acquiring a connection in count_products"
        );
        assert_eq!(
            describe("insert_category", &sqlx::Error::PoolClosed),
            "connection pool closed in insert_category"
        );
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }
}
