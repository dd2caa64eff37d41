//! In-memory catalog store.
//!
//! Same observable semantics as the Postgres repositories: two-phase list
//! calls, `price DESC, code ASC` ordering, unique category codes, and atomic
//! batch inserts. Useful for local runs without a database and for tests.
//!
//! Storage failures can be simulated per operation with
//! [`InMemoryCatalogStore::fail_next`].

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use rust_decimal::Decimal;

use catalog_core::{CatalogError, CatalogResult, CategoryId, Page, Pagination, ProductId, VariantId};
use catalog_observability::SharedLogger;
use catalog_products::{
    Category, CategoryStore, CreateCategoryInput, Product, ProductFilter, ProductStore, Variant,
};

use super::seed::{SeedCatalog, SeedVariant, demo_catalog};

/// A storage operation that can be made to fail once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StorageOp {
    CountProducts,
    SelectProducts,
    FetchProduct,
    CountCategories,
    SelectCategories,
    InsertCategory,
    LookupCategoryCodes,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageOp::CountProducts => "count_products",
            StorageOp::SelectProducts => "select_products",
            StorageOp::FetchProduct => "get_product_by_code",
            StorageOp::CountCategories => "count_categories",
            StorageOp::SelectCategories => "select_categories",
            StorageOp::InsertCategory => "insert_category",
            StorageOp::LookupCategoryCodes => "lookup_category_codes",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct ProductRow {
    id: ProductId,
    code: String,
    price: Decimal,
    category_id: CategoryId,
}

#[derive(Debug)]
struct VariantRow {
    id: VariantId,
    product_id: ProductId,
    name: String,
    sku: String,
    price: Option<Decimal>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<ProductRow>,
    variants: Vec<VariantRow>,
    last_category_id: i64,
    last_product_id: i64,
    last_variant_id: i64,
}

impl Tables {
    fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn category_by_code(&self, code: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.code == code)
    }

    fn insert_category(&mut self, code: &str, name: &str) -> Category {
        self.last_category_id += 1;
        let category = Category {
            id: CategoryId::new(self.last_category_id),
            code: code.to_string(),
            name: name.to_string(),
        };
        self.categories.push(category.clone());
        category
    }

    fn insert_product(&mut self, code: &str, price: Decimal, category_id: CategoryId) -> ProductId {
        self.last_product_id += 1;
        let id = ProductId::new(self.last_product_id);
        self.products.push(ProductRow {
            id,
            code: code.to_string(),
            price,
            category_id,
        });
        id
    }

    fn insert_variant(&mut self, product_id: ProductId, variant: &SeedVariant) {
        self.last_variant_id += 1;
        self.variants.push(VariantRow {
            id: VariantId::new(self.last_variant_id),
            product_id,
            name: variant.name.to_string(),
            sku: variant.sku.to_string(),
            price: variant.price,
        });
    }

    fn matches(&self, row: &ProductRow, filter: &ProductFilter) -> bool {
        self.category(row.category_id)
            .is_some_and(|c| filter.matches(&c.code, row.price))
    }

    fn assemble(&self, row: &ProductRow) -> Result<Product, String> {
        let category = self
            .category(row.category_id)
            .cloned()
            .ok_or_else(|| format!("product {} references missing category", row.code))?;

        let mut variants: Vec<&VariantRow> = self
            .variants
            .iter()
            .filter(|v| v.product_id == row.id)
            .collect();
        variants.sort_by_key(|v| v.id.get());

        Ok(Product {
            id: row.id,
            code: row.code.clone(),
            price: row.price,
            category,
            variants: variants
                .into_iter()
                .map(|v| Variant {
                    id: v.id,
                    name: v.name.clone(),
                    sku: v.sku.clone(),
                    price: v.price,
                })
                .collect(),
        })
    }
}

/// Catalog tables behind a single `RwLock`.
#[derive(Debug)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
    faults: Mutex<HashSet<StorageOp>>,
    log: SharedLogger,
}

impl InMemoryCatalogStore {
    pub fn new(log: SharedLogger) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            faults: Mutex::new(HashSet::new()),
            log,
        }
    }

    /// Store preloaded with [`demo_catalog`].
    pub fn seeded(log: SharedLogger) -> CatalogResult<Self> {
        let store = Self::new(log);
        store.load(&demo_catalog())?;
        Ok(store)
    }

    /// Insert fixture rows. Category and product codes must be unique, and
    /// every product must reference a loaded category.
    pub fn load(&self, catalog: &SeedCatalog) -> CatalogResult<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| CatalogError::create("catalog", "catalog tables lock poisoned"))?;

        for c in &catalog.categories {
            if tables.category_by_code(c.code).is_some() {
                return Err(CatalogError::already_exists("category"));
            }
            tables.insert_category(c.code, c.name);
        }

        for p in &catalog.products {
            if tables.products.iter().any(|r| r.code == p.code) {
                return Err(CatalogError::already_exists("product"));
            }
            let category_id = tables
                .category_by_code(p.category_code)
                .map(|c| c.id)
                .ok_or_else(|| {
                    CatalogError::create("product", format!("unknown category {}", p.category_code))
                })?;
            let product_id = tables.insert_product(p.code, p.price, category_id);
            for v in &p.variants {
                tables.insert_variant(product_id, v);
            }
        }

        Ok(())
    }

    /// Make the next call of `op` fail with a storage error.
    pub fn fail_next(&self, op: StorageOp) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(op);
        }
    }

    /// Every stored category, in insertion order.
    pub fn categories(&self) -> Vec<Category> {
        match self.tables.read() {
            Ok(tables) => tables.categories.clone(),
            Err(_) => Vec::new(),
        }
    }

    fn trip(&self, op: StorageOp) -> Result<(), String> {
        let mut faults = self
            .faults
            .lock()
            .map_err(|_| "fault registry lock poisoned".to_string())?;
        if faults.remove(&op) {
            return Err(format!("simulated storage failure in {}", op));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, String> {
        self.tables
            .read()
            .map_err(|_| "catalog tables lock poisoned".to_string())
    }

    fn count_products(&self, filter: &ProductFilter) -> Result<u64, String> {
        self.trip(StorageOp::CountProducts)?;
        let tables = self.read()?;
        let n = tables
            .products
            .iter()
            .filter(|p| tables.matches(p, filter))
            .count();
        Ok(n as u64)
    }

    fn select_products(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, String> {
        self.trip(StorageOp::SelectProducts)?;
        let tables = self.read()?;
        let mut matching: Vec<&ProductRow> = tables
            .products
            .iter()
            .filter(|p| tables.matches(p, filter))
            .collect();
        matching.sort_by(|a, b| b.price.cmp(&a.price).then_with(|| a.code.cmp(&b.code)));

        pagination
            .window(matching)
            .into_iter()
            .map(|row| tables.assemble(row))
            .collect()
    }

    fn find_product(&self, code: &str) -> Result<Option<Product>, String> {
        self.trip(StorageOp::FetchProduct)?;
        let tables = self.read()?;
        tables
            .products
            .iter()
            .find(|p| p.code == code)
            .map(|row| tables.assemble(row))
            .transpose()
    }

    fn count_categories(&self, category_code: Option<&str>) -> Result<u64, String> {
        self.trip(StorageOp::CountCategories)?;
        let tables = self.read()?;
        let n = tables
            .categories
            .iter()
            .filter(|c| category_code.is_none_or(|code| c.code == code))
            .count();
        Ok(n as u64)
    }

    fn select_categories(
        &self,
        pagination: Pagination,
        category_code: Option<&str>,
    ) -> Result<Vec<Category>, String> {
        self.trip(StorageOp::SelectCategories)?;
        let tables = self.read()?;
        let mut matching: Vec<&Category> = tables
            .categories
            .iter()
            .filter(|c| category_code.is_none_or(|code| c.code == code))
            .collect();
        matching.sort_by(|a, b| a.code.cmp(&b.code));

        Ok(pagination.window(matching).into_iter().cloned().collect())
    }

    /// `Ok(None)` when a code is already taken (or repeated within `rows`);
    /// nothing is written in that case.
    fn insert_all(&self, rows: &[CreateCategoryInput]) -> Result<Option<Vec<Category>>, String> {
        self.trip(StorageOp::InsertCategory)?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| "catalog tables lock poisoned".to_string())?;

        let conflict = rows.iter().enumerate().any(|(i, row)| {
            tables.category_by_code(&row.code).is_some()
                || rows[..i].iter().any(|earlier| earlier.code == row.code)
        });
        if conflict {
            return Ok(None);
        }

        Ok(Some(
            rows.iter()
                .map(|row| tables.insert_category(&row.code, &row.name))
                .collect(),
        ))
    }

    fn report_existing(&self, codes: &[String]) {
        let existing = self.trip(StorageOp::LookupCategoryCodes).and_then(|()| {
            let tables = self.read()?;
            let mut found: Vec<String> = tables
                .categories
                .iter()
                .filter(|c| codes.contains(&c.code))
                .map(|c| c.code.clone())
                .collect();
            found.sort();
            Ok(found)
        });

        match existing {
            Ok(found) if found.is_empty() => self.log.warn(
                "conflicting category codes are duplicated within the batch",
                &[("codes", codes.join(","))],
            ),
            Ok(found) => self.log.warn(
                "conflicting category codes already exist in database",
                &[("codes", found.join(","))],
            ),
            Err(message) => self.log.warn(
                "failed to look up existing category codes",
                &[("error", message)],
            ),
        }
    }

    fn log_failure(
        &self,
        log_message: &str,
        extra: Option<(&'static str, String)>,
        message: &str,
    ) {
        let mut fields: Vec<(&'static str, String)> = extra.into_iter().collect();
        fields.push(("error", message.to_string()));
        self.log.error(log_message, &fields);
    }
}

#[async_trait]
impl ProductStore for InMemoryCatalogStore {
    async fn list_products(
        &self,
        pagination: Pagination,
        filter: &ProductFilter,
    ) -> CatalogResult<Page<Product>> {
        let total = self.count_products(filter).map_err(|message| {
            self.log_failure("repository error counting products", None, &message);
            CatalogError::count("products", message)
        })?;

        let items = self.select_products(pagination, filter).map_err(|message| {
            self.log_failure("repository error fetching products", None, &message);
            CatalogError::fetch("products", message)
        })?;

        Ok(Page::new(items, total))
    }

    async fn get_by_code(&self, code: &str) -> CatalogResult<Product> {
        let found = self.find_product(code).map_err(|message| {
            self.log_failure(
                "repository error fetching product",
                Some(("code", code.to_string())),
                &message,
            );
            CatalogError::fetch("product", message)
        })?;

        found.ok_or_else(|| CatalogError::not_found("product"))
    }
}

#[async_trait]
impl CategoryStore for InMemoryCatalogStore {
    async fn list_categories(
        &self,
        pagination: Pagination,
        category_code: Option<&str>,
    ) -> CatalogResult<Page<Category>> {
        let total = self.count_categories(category_code).map_err(|message| {
            self.log_failure("repository error counting categories", None, &message);
            CatalogError::count("categories", message)
        })?;

        let items = self
            .select_categories(pagination, category_code)
            .map_err(|message| {
                self.log_failure("repository error fetching categories", None, &message);
                CatalogError::fetch("categories", message)
            })?;

        Ok(Page::new(items, total))
    }

    async fn create_category(&self, code: &str, name: &str) -> CatalogResult<Category> {
        let input = CreateCategoryInput::new(code, name).normalized();

        let inserted = self
            .insert_all(std::slice::from_ref(&input))
            .map_err(|message| {
                self.log_failure("repository error creating category", None, &message);
                CatalogError::create("category", message)
            })?;

        match inserted.and_then(|mut rows| rows.pop()) {
            Some(category) => Ok(category),
            None => {
                self.log
                    .warn("category code already exists", &[("code", input.code)]);
                Err(CatalogError::already_exists("category"))
            }
        }
    }

    async fn create_categories(&self, inputs: &[CreateCategoryInput]) -> CatalogResult<()> {
        if inputs.is_empty() {
            return Err(CatalogError::empty_batch("categories"));
        }

        let rows: Vec<CreateCategoryInput> = inputs.iter().map(CreateCategoryInput::normalized).collect();

        let inserted = self.insert_all(&rows).map_err(|message| {
            self.log_failure("repository error creating category", None, &message);
            CatalogError::create("category", message)
        })?;

        if inserted.is_some() {
            return Ok(());
        }

        let codes: Vec<String> = rows.into_iter().map(|r| r.code).collect();
        self.log.warn(
            "batch category creation rejected by duplicate code",
            &[("codes", codes.join(","))],
        );
        self.report_existing(&codes);
        Err(CatalogError::already_exists("categories"))
    }
}
