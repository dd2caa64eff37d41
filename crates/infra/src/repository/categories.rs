//! Postgres-backed category repository: listing and creation.
//!
//! Inserts rely on the unique constraint on `categories.code`; a `23505`
//! becomes `AlreadyExists`. A batch runs inside one transaction, so a single
//! conflicting element (existing row or duplicate within the batch) leaves the
//! table untouched.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, field, instrument};

use catalog_core::{CatalogError, CatalogResult, CategoryId, Page, Pagination};
use catalog_observability::SharedLogger;
use catalog_products::{Category, CategoryStore, CreateCategoryInput};

use super::sqlx_errors::{describe, is_unique_violation};

const RESOURCE_LIST: &str = "categories";
const RESOURCE_ONE: &str = "category";

/// Postgres category repository.
#[derive(Debug, Clone)]
pub struct PostgresCategoryStore {
    pool: Arc<PgPool>,
    log: SharedLogger,
}

impl PostgresCategoryStore {
    pub fn new(pool: PgPool, log: SharedLogger) -> Self {
        Self {
            pool: Arc::new(pool),
            log,
        }
    }

    #[instrument(
        skip(self),
        fields(
            limit = pagination.limit,
            offset = pagination.offset,
            total = field::Empty
        )
    )]
    pub async fn query_page(
        &self,
        pagination: Pagination,
        category_code: Option<&str>,
    ) -> CatalogResult<Page<Category>> {
        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM categories
            WHERE ($1::text IS NULL OR code = $1)
            "#,
        )
        .bind(category_code)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| self.count_failed(&e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| self.count_failed(&e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, code, name
            FROM categories
            WHERE ($1::text IS NULL OR code = $1)
            ORDER BY code ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category_code)
        .bind(i64::from(pagination.limit))
        .bind(i64::try_from(pagination.offset).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| self.fetch_failed(&e))?;

        let items = rows
            .iter()
            .map(|row| CategoryRow::from_row(row).map(CategoryRow::into_category))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.fetch_failed(&e))?;

        Span::current().record("total", total);
        Ok(Page::new(items, u64::try_from(total).unwrap_or(0)))
    }

    /// Insert one category and return the persisted row.
    #[instrument(skip(self, name))]
    pub async fn insert_one(&self, code: &str, name: &str) -> CatalogResult<Category> {
        let input = CreateCategoryInput::new(code, name).normalized();

        let result = sqlx::query(
            r#"
            INSERT INTO categories (code, name)
            VALUES ($1, $2)
            RETURNING id, code, name
            "#,
        )
        .bind(&input.code)
        .bind(&input.name)
        .fetch_one(&*self.pool)
        .await;

        match result {
            Ok(row) => CategoryRow::from_row(&row)
                .map(CategoryRow::into_category)
                .map_err(|e| self.create_failed("insert_category", &e)),
            Err(e) if is_unique_violation(&e) => {
                self.log.warn(
                    "category code already exists",
                    &[("code", input.code.clone())],
                );
                Err(CatalogError::already_exists(RESOURCE_ONE))
            }
            Err(e) => Err(self.create_failed("insert_category", &e)),
        }
    }

    /// Insert every category in one transaction.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn insert_batch(&self, inputs: &[CreateCategoryInput]) -> CatalogResult<()> {
        if inputs.is_empty() {
            return Err(CatalogError::empty_batch(RESOURCE_LIST));
        }

        let rows: Vec<CreateCategoryInput> = inputs.iter().map(CreateCategoryInput::normalized).collect();

        match self.insert_all(&rows).await {
            Ok(()) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                let codes: Vec<String> = rows.into_iter().map(|r| r.code).collect();
                self.log.warn(
                    "batch category creation rejected by duplicate code",
                    &[("codes", codes.join(","))],
                );
                self.report_existing(&codes).await;
                Err(CatalogError::already_exists(RESOURCE_LIST))
            }
            Err(e) => Err(self.create_failed("insert_categories", &e)),
        }
    }

    /// Dropping an uncommitted transaction rolls it back, so an early return on
    /// any insert error discards the rows inserted before it.
    async fn insert_all(&self, rows: &[CreateCategoryInput]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO categories (code, name)
                VALUES ($1, $2)
                "#,
            )
            .bind(&row.code)
            .bind(&row.name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Diagnostic lookup after a batch conflict. Only logs; never changes the
    /// outcome returned to the caller.
    async fn report_existing(&self, codes: &[String]) {
        let existing = sqlx::query_scalar::<_, String>(
            r#"
            SELECT code
            FROM categories
            WHERE code = ANY($1)
            ORDER BY code ASC
            "#,
        )
        .bind(codes)
        .fetch_all(&*self.pool)
        .await;

        match existing {
            Ok(found) if found.is_empty() => self.log.warn(
                "conflicting category codes are duplicated within the batch",
                &[("codes", codes.join(","))],
            ),
            Ok(found) => self.log.warn(
                "conflicting category codes already exist in database",
                &[("codes", found.join(","))],
            ),
            Err(e) => self.log.warn(
                "failed to look up existing category codes",
                &[("error", describe("lookup_category_codes", &e))],
            ),
        }
    }

    fn count_failed(&self, err: &sqlx::Error) -> CatalogError {
        let message = describe("count_categories", err);
        self.log.error(
            "repository error counting categories",
            &[("error", message.clone())],
        );
        CatalogError::count(RESOURCE_LIST, message)
    }

    fn fetch_failed(&self, err: &sqlx::Error) -> CatalogError {
        let message = describe("select_categories", err);
        self.log.error(
            "repository error fetching categories",
            &[("error", message.clone())],
        );
        CatalogError::fetch(RESOURCE_LIST, message)
    }

    fn create_failed(&self, operation: &str, err: &sqlx::Error) -> CatalogError {
        let message = describe(operation, err);
        self.log.error(
            "repository error creating category",
            &[("error", message.clone())],
        );
        CatalogError::create(RESOURCE_ONE, message)
    }
}

#[async_trait]
impl CategoryStore for PostgresCategoryStore {
    async fn list_categories(
        &self,
        pagination: Pagination,
        category_code: Option<&str>,
    ) -> CatalogResult<Page<Category>> {
        self.query_page(pagination, category_code).await
    }

    async fn create_category(&self, code: &str, name: &str) -> CatalogResult<Category> {
        self.insert_one(code, name).await
    }

    async fn create_categories(&self, inputs: &[CreateCategoryInput]) -> CatalogResult<()> {
        self.insert_batch(inputs).await
    }
}

#[derive(Debug)]
struct CategoryRow {
    id: i64,
    code: String,
    name: String,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId::new(self.id),
            code: self.code,
            name: self.name,
        }
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for CategoryRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
        })
    }
}
