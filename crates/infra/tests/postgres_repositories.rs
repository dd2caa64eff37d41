//! Postgres repository tests.
//!
//! Each test creates its own schema on the server named by `DATABASE_URL`,
//! loads a fixture, and drops the schema afterwards. Without `DATABASE_URL`
//! the tests return early.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use catalog_core::{CatalogError, Pagination};
use catalog_infra::repository::seed::{SeedCatalog, SeedCategory, SeedProduct, demo_catalog};
use catalog_infra::repository::{PostgresCategoryStore, PostgresProductStore, ReadConsistency};
use catalog_observability::{LogLevel, RecordingLogger};
use catalog_products::{CategoryStore, CreateCategoryInput, Product, ProductFilter, ProductStore};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

const SCHEMA: &str = r#"
CREATE TABLE categories (
    id BIGSERIAL PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);
CREATE TABLE products (
    id BIGSERIAL PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    price NUMERIC(10, 2) NOT NULL CHECK (price > 0),
    category_id BIGINT NOT NULL REFERENCES categories (id)
);
CREATE TABLE product_variants (
    id BIGSERIAL PRIMARY KEY,
    product_id BIGINT NOT NULL REFERENCES products (id),
    name TEXT NOT NULL,
    sku TEXT NOT NULL UNIQUE,
    price NUMERIC(10, 2)
);
"#;

const MODES: [ReadConsistency; 2] = [ReadConsistency::Independent, ReadConsistency::Snapshot];

static NEXT_SCHEMA: AtomicU32 = AtomicU32::new(0);

struct TestDb {
    pool: PgPool,
    schema: String,
}

impl TestDb {
    async fn start() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping Postgres repository test");
            return None;
        };

        let schema = format!(
            "catalog_test_{}_{}",
            std::process::id(),
            NEXT_SCHEMA.fetch_add(1, Ordering::SeqCst)
        );
        let options = PgConnectOptions::from_str(&url)
            .unwrap()
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap();

        let ddl = format!("CREATE SCHEMA {schema};\n{SCHEMA}");
        sqlx::raw_sql(&ddl).execute(&pool).await.unwrap();

        Some(Self { pool, schema })
    }

    async fn load(&self, catalog: &SeedCatalog) {
        for c in &catalog.categories {
            sqlx::query("INSERT INTO categories (code, name) VALUES ($1, $2)")
                .bind(c.code)
                .bind(c.name)
                .execute(&self.pool)
                .await
                .unwrap();
        }

        for p in &catalog.products {
            let product_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO products (code, price, category_id)
                SELECT $1, $2, id FROM categories WHERE code = $3
                RETURNING id
                "#,
            )
            .bind(p.code)
            .bind(p.price)
            .bind(p.category_code)
            .fetch_one(&self.pool)
            .await
            .unwrap();

            for v in &p.variants {
                sqlx::query(
                    "INSERT INTO product_variants (product_id, name, sku, price) VALUES ($1, $2, $3, $4)",
                )
                .bind(product_id)
                .bind(v.name)
                .bind(v.sku)
                .bind(v.price)
                .execute(&self.pool)
                .await
                .unwrap();
            }
        }
    }

    async fn category_codes(&self) -> Vec<String> {
        sqlx::query_scalar("SELECT code FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }

    fn products(&self, consistency: ReadConsistency) -> (PostgresProductStore, Arc<RecordingLogger>) {
        let log = Arc::new(RecordingLogger::new());
        let store =
            PostgresProductStore::new(self.pool.clone(), log.clone()).with_consistency(consistency);
        (store, log)
    }

    fn categories(&self) -> (PostgresCategoryStore, Arc<RecordingLogger>) {
        let log = Arc::new(RecordingLogger::new());
        (PostgresCategoryStore::new(self.pool.clone(), log.clone()), log)
    }

    async fn drop_schema(self) {
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.pool)
            .await
            .unwrap();
        self.pool.close().await;
    }
}

fn two_products() -> SeedCatalog {
    SeedCatalog {
        categories: vec![
            SeedCategory {
                code: "CLOTHING",
                name: "Clothing",
            },
            SeedCategory {
                code: "ACCESSORIES",
                name: "Accessories",
            },
        ],
        products: vec![
            SeedProduct {
                code: "PROD001",
                price: dec!(10.99),
                category_code: "CLOTHING",
                variants: vec![],
            },
            SeedProduct {
                code: "PROD002",
                price: dec!(12.49),
                category_code: "ACCESSORIES",
                variants: vec![],
            },
        ],
    }
}

fn codes(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.code.as_str()).collect()
}

#[tokio::test]
async fn list_orders_by_price_and_applies_strict_max_price() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    db.load(&two_products()).await;

    for mode in MODES {
        let (store, log) = db.products(mode);

        let page = store
            .list_products(Pagination::default(), &ProductFilter::new())
            .await
            .unwrap();
        assert_eq!(page.total, 2, "{mode:?}");
        assert_eq!(codes(&page.items), vec!["PROD002", "PROD001"], "{mode:?}");
        assert_eq!(page.items[0].price, dec!(12.49));
        assert_eq!(page.items[0].category.code, "ACCESSORIES");

        let below = ProductFilter::new().with_max_price(Some(dec!(11.00)));
        let page = store.list_products(Pagination::default(), &below).await.unwrap();
        assert_eq!(page.total, 1, "{mode:?}");
        assert_eq!(codes(&page.items), vec!["PROD001"], "{mode:?}");

        let at_price = ProductFilter::new().with_max_price(Some(dec!(10.99)));
        let page = store.list_products(Pagination::default(), &at_price).await.unwrap();
        assert_eq!(page.total, 0, "{mode:?}");
        assert!(page.items.is_empty());

        assert!(log.at_level(LogLevel::Error).is_empty());
    }

    db.drop_schema().await;
}

#[tokio::test]
async fn list_filters_by_category_and_windows_the_page() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    db.load(&demo_catalog()).await;

    for mode in MODES {
        let (store, _log) = db.products(mode);

        let page = store
            .list_products(Pagination::new(3, 0), &ProductFilter::new())
            .await
            .unwrap();
        assert_eq!(page.total, 8, "{mode:?}");
        assert_eq!(codes(&page.items), vec!["PROD005", "PROD007", "PROD004"]);

        let clothing = ProductFilter::new().with_category_code("CLOTHING");
        let page = store.list_products(Pagination::new(2, 1), &clothing).await.unwrap();
        assert_eq!(page.total, 3, "{mode:?}");
        assert_eq!(codes(&page.items), vec!["PROD004", "PROD001"]);

        let page = store
            .list_products(Pagination::new(10, 50), &ProductFilter::new())
            .await
            .unwrap();
        assert_eq!(page.total, 8, "{mode:?}");
        assert!(page.items.is_empty());
    }

    db.drop_schema().await;
}

#[tokio::test]
async fn equal_prices_are_ordered_by_code() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    let mut fixture = two_products();
    fixture.products.push(SeedProduct {
        code: "PROD000",
        price: dec!(12.49),
        category_code: "CLOTHING",
        variants: vec![],
    });
    db.load(&fixture).await;

    for mode in MODES {
        let (store, _log) = db.products(mode);
        let page = store
            .list_products(Pagination::default(), &ProductFilter::new())
            .await
            .unwrap();
        assert_eq!(codes(&page.items), vec!["PROD000", "PROD002", "PROD001"], "{mode:?}");
    }

    db.drop_schema().await;
}

#[tokio::test]
async fn variants_are_loaded_for_listed_and_single_products() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    db.load(&demo_catalog()).await;
    let (store, log) = db.products(ReadConsistency::Independent);

    let product = store.get_by_code("PROD001").await.unwrap();
    assert_eq!(product.category.code, "CLOTHING");
    let priced: Vec<_> = product
        .priced_variants()
        .map(|(v, price)| (v.sku.as_str(), price))
        .collect();
    assert_eq!(
        priced,
        vec![
            ("SKU001A", dec!(11.99)),
            ("SKU001B", dec!(10.99)),
            ("SKU001C", dec!(10.99)),
        ]
    );
    assert_eq!(product.variants[1].price, None);

    let clothing = ProductFilter::new().with_category_code("CLOTHING");
    let page = store.list_products(Pagination::default(), &clothing).await.unwrap();
    let variant_counts: Vec<_> = page
        .items
        .iter()
        .map(|p| (p.code.as_str(), p.variants.len()))
        .collect();
    assert_eq!(
        variant_counts,
        vec![("PROD007", 0), ("PROD004", 0), ("PROD001", 3)]
    );

    let err = store.get_by_code("PROD999").await.unwrap_err();
    assert_eq!(err, CatalogError::not_found("product"));
    assert!(log.at_level(LogLevel::Error).is_empty());

    db.drop_schema().await;
}

#[tokio::test]
async fn closed_pool_is_classified_by_phase() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    let (independent, log) = db.products(ReadConsistency::Independent);
    let (snapshot, _) = db.products(ReadConsistency::Snapshot);
    let (categories, _) = db.categories();
    db.drop_schema().await;

    for store in [&independent, &snapshot] {
        let err = store
            .list_products(Pagination::default(), &ProductFilter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CountFailure { resource: "products", .. }));
    }

    let err = independent.get_by_code("PROD001").await.unwrap_err();
    assert!(matches!(err, CatalogError::FetchFailure { resource: "product", .. }));

    let err = categories.create_category("HATS", "Hats").await.unwrap_err();
    assert!(matches!(err, CatalogError::CreateFailure { .. }));

    let errors = log.at_level(LogLevel::Error);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[1].field("code"), Some("PROD001"));
}

#[tokio::test]
async fn categories_are_listed_by_code_with_filter() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    db.load(&demo_catalog()).await;
    let (store, _log) = db.categories();

    let page = store.list_categories(Pagination::default(), None).await.unwrap();
    assert_eq!(page.total, 3);
    let listed: Vec<_> = page.items.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(listed, vec!["ACCESSORIES", "CLOTHING", "SHOES"]);

    let page = store
        .list_categories(Pagination::new(1, 0), Some("SHOES"))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Shoes");

    db.drop_schema().await;
}

#[tokio::test]
async fn duplicate_single_create_is_already_exists() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    db.load(&demo_catalog()).await;
    let (store, log) = db.categories();

    let created = store.create_category(" FOO ", "foo").await.unwrap();
    assert_eq!(created.code, "FOO");
    assert_eq!(created.name, "foo");

    let before = db.category_codes().await;
    let err = store.create_category("SHOES", "Shoes2").await.unwrap_err();

    assert_eq!(err, CatalogError::already_exists("category"));
    assert_eq!(db.category_codes().await, before);
    assert!(log.at_level(LogLevel::Error).is_empty());
    assert_eq!(log.at_level(LogLevel::Warn).len(), 1);

    db.drop_schema().await;
}

#[tokio::test]
async fn conflicting_batch_rolls_back_every_row() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    db.load(&demo_catalog()).await;
    let (store, log) = db.categories();
    let before = db.category_codes().await;

    let err = store
        .create_categories(&[
            CreateCategoryInput::new("FOO", "foo"),
            CreateCategoryInput::new("SHOES", "Shoes"),
        ])
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::already_exists("categories"));
    assert_eq!(db.category_codes().await, before);
    assert!(log.at_level(LogLevel::Warn).iter().any(|r| {
        r.message == "conflicting category codes already exist in database"
            && r.field("codes") == Some("SHOES")
    }));

    let err = store
        .create_categories(&[
            CreateCategoryInput::new("FOO", "foo"),
            CreateCategoryInput::new(" FOO ", "foo again"),
        ])
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::already_exists("categories"));
    assert_eq!(db.category_codes().await, before);

    store
        .create_categories(&[
            CreateCategoryInput::new(" FOO ", "foo"),
            CreateCategoryInput::new("BAR", "bar"),
        ])
        .await
        .unwrap();
    let after = db.category_codes().await;
    assert_eq!(after.len(), before.len() + 2);
    assert_eq!(after.iter().filter(|c| c.as_str() == "FOO").count(), 1);
    assert!(log.at_level(LogLevel::Error).is_empty());

    db.drop_schema().await;
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let Some(db) = TestDb::start().await else {
        return;
    };
    let (store, log) = db.categories();

    let err = store.create_categories(&[]).await.unwrap_err();
    assert_eq!(err, CatalogError::empty_batch("categories"));
    assert!(log.records().is_empty());

    db.drop_schema().await;
}
