//! Postgres-backed product query repository.
//!
//! Products are read with their category joined in, then the variants of every
//! returned product are loaded with a single `product_id = ANY($1)` query.
//!
//! ## List calls
//!
//! A list call is two statements over the same predicates: a `COUNT(*)` for
//! `total`, then the ordered, windowed select. With
//! [`ReadConsistency::Independent`] each statement borrows its own pooled
//! connection; with [`ReadConsistency::Snapshot`] both run inside one
//! `REPEATABLE READ, READ ONLY` transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool, Row};
use tracing::{Span, field, instrument};

use catalog_core::{CatalogError, CatalogResult, CategoryId, Page, Pagination, ProductId, VariantId};
use catalog_observability::SharedLogger;
use catalog_products::{Category, Product, ProductFilter, ProductStore, Variant};

use super::ReadConsistency;
use super::sqlx_errors::describe;

const RESOURCE_LIST: &str = "products";
const RESOURCE_ONE: &str = "product";

/// Postgres product repository.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
    log: SharedLogger,
    consistency: ReadConsistency,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool, log: SharedLogger) -> Self {
        Self {
            pool: Arc::new(pool),
            log,
            consistency: ReadConsistency::default(),
        }
    }

    pub fn with_consistency(mut self, consistency: ReadConsistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Count, then select one page of products.
    #[instrument(
        skip(self, filter),
        fields(
            limit = pagination.limit,
            offset = pagination.offset,
            consistency = ?self.consistency,
            total = field::Empty,
            returned = field::Empty
        )
    )]
    pub async fn query_page(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> CatalogResult<Page<Product>> {
        let page = match self.consistency {
            ReadConsistency::Independent => self.query_page_independent(pagination, filter).await?,
            ReadConsistency::Snapshot => self.query_page_snapshot(pagination, filter).await?,
        };

        let span = Span::current();
        span.record("total", page.total);
        span.record("returned", page.items.len());
        Ok(page)
    }

    async fn query_page_independent(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> CatalogResult<Page<Product>> {
        let total = {
            let mut conn = self
                .pool
                .acquire()
                .await
                .map_err(|e| self.count_failed(&e))?;
            count_products(&mut conn, filter)
                .await
                .map_err(|e| self.count_failed(&e))?
        };

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.list_fetch_failed(&e))?;
        let items = select_products(&mut conn, pagination, filter)
            .await
            .map_err(|e| self.list_fetch_failed(&e))?;

        Ok(Page::new(items, total))
    }

    async fn query_page_snapshot(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> CatalogResult<Page<Product>> {
        let mut tx = self.pool.begin().await.map_err(|e| self.count_failed(&e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| self.count_failed(&e))?;

        let total = count_products(&mut tx, filter)
            .await
            .map_err(|e| self.count_failed(&e))?;
        let items = select_products(&mut tx, pagination, filter)
            .await
            .map_err(|e| self.list_fetch_failed(&e))?;

        tx.commit().await.map_err(|e| self.list_fetch_failed(&e))?;

        Ok(Page::new(items, total))
    }

    /// Single product by exact code.
    #[instrument(skip(self))]
    pub async fn query_by_code(&self, code: &str) -> CatalogResult<Product> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.detail_fetch_failed(code, &e))?;

        let row = sqlx::query(
            r#"
            SELECT
                p.id,
                p.code,
                p.price,
                c.id AS category_id,
                c.code AS category_code,
                c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| self.detail_fetch_failed(code, &e))?;

        // Expected outcome; not logged as an error.
        let Some(row) = row else {
            return Err(CatalogError::not_found(RESOURCE_ONE));
        };

        let head = ProductRow::from_row(&row).map_err(|e| self.detail_fetch_failed(code, &e))?;
        let mut variants = load_variants(&mut conn, &[head.id])
            .await
            .map_err(|e| self.detail_fetch_failed(code, &e))?;
        let own = variants.remove(&head.id).unwrap_or_default();

        Ok(head.into_product(own))
    }

    fn count_failed(&self, err: &sqlx::Error) -> CatalogError {
        let message = describe("count_products", err);
        self.log.error(
            "repository error counting products",
            &[("error", message.clone())],
        );
        CatalogError::count(RESOURCE_LIST, message)
    }

    fn list_fetch_failed(&self, err: &sqlx::Error) -> CatalogError {
        let message = describe("select_products", err);
        self.log.error(
            "repository error fetching products",
            &[("error", message.clone())],
        );
        CatalogError::fetch(RESOURCE_LIST, message)
    }

    fn detail_fetch_failed(&self, code: &str, err: &sqlx::Error) -> CatalogError {
        let message = describe("get_product_by_code", err);
        self.log.error(
            "repository error fetching product",
            &[("code", code.to_string()), ("error", message.clone())],
        );
        CatalogError::fetch(RESOURCE_ONE, message)
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn list_products(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> CatalogResult<Page<Product>> {
        self.query_page(pagination, filter).await
    }

    async fn get_by_code(&self, code: &str) -> CatalogResult<Product> {
        self.query_by_code(code).await
    }
}

async fn count_products(conn: &mut PgConnection, filter: &ProductFilter) -> Result<u64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total
        FROM products p
        JOIN categories c ON c.id = p.category_id
        WHERE ($1::text IS NULL OR c.code = $1)
            AND ($2::numeric IS NULL OR p.price < $2)
        "#,
    )
    .bind(filter.category_code.as_deref())
    .bind(filter.max_price)
    .fetch_one(&mut *conn)
    .await?;

    let total: i64 = row.try_get("total")?;
    Ok(u64::try_from(total).unwrap_or(0))
}

async fn select_products(
    conn: &mut PgConnection,
    pagination: Pagination,
    filter: &ProductFilter,
) -> Result<Vec<Product>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT
            p.id,
            p.code,
            p.price,
            c.id AS category_id,
            c.code AS category_code,
            c.name AS category_name
        FROM products p
        JOIN categories c ON c.id = p.category_id
        WHERE ($1::text IS NULL OR c.code = $1)
            AND ($2::numeric IS NULL OR p.price < $2)
        ORDER BY p.price DESC, p.code ASC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.category_code.as_deref())
    .bind(filter.max_price)
    .bind(i64::from(pagination.limit))
    .bind(i64::try_from(pagination.offset).unwrap_or(i64::MAX))
    .fetch_all(&mut *conn)
    .await?;

    let heads = rows
        .iter()
        .map(ProductRow::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    let ids: Vec<i64> = heads.iter().map(|h| h.id).collect();
    let mut variants = load_variants(conn, &ids).await?;

    Ok(heads
        .into_iter()
        .map(|head| {
            let own = variants.remove(&head.id).unwrap_or_default();
            head.into_product(own)
        })
        .collect())
}

/// Variants of the given products, grouped by product id, each group ordered by
/// variant id.
async fn load_variants(
    conn: &mut PgConnection,
    product_ids: &[i64],
) -> Result<HashMap<i64, Vec<Variant>>, sqlx::Error> {
    let mut grouped: HashMap<i64, Vec<Variant>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = sqlx::query(
        r#"
        SELECT id, product_id, name, sku, price
        FROM product_variants
        WHERE product_id = ANY($1)
        ORDER BY id ASC
        "#,
    )
    .bind(product_ids)
    .fetch_all(&mut *conn)
    .await?;

    for row in rows {
        let variant = VariantRow::from_row(&row)?;
        grouped
            .entry(variant.product_id)
            .or_default()
            .push(variant.into_variant());
    }

    Ok(grouped)
}

/// Product joined with its category.
#[derive(Debug)]
struct ProductRow {
    id: i64,
    code: String,
    price: Decimal,
    category_id: i64,
    category_code: String,
    category_name: String,
}

impl ProductRow {
    fn into_product(self, variants: Vec<Variant>) -> Product {
        Product {
            id: ProductId::new(self.id),
            code: self.code,
            price: self.price,
            category: Category {
                id: CategoryId::new(self.category_id),
                code: self.category_code,
                name: self.category_name,
            },
            variants,
        }
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            price: row.try_get("price")?,
            category_id: row.try_get("category_id")?,
            category_code: row.try_get("category_code")?,
            category_name: row.try_get("category_name")?,
        })
    }
}

#[derive(Debug)]
struct VariantRow {
    id: i64,
    product_id: i64,
    name: String,
    sku: String,
    price: Option<Decimal>,
}

impl VariantRow {
    fn into_variant(self) -> Variant {
        Variant {
            id: VariantId::new(self.id),
            name: self.name,
            sku: self.sku,
            price: self.price,
        }
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for VariantRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(VariantRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            price: row.try_get("price")?,
        })
    }
}
