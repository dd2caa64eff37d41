//! Demo catalog fixture.
//!
//! Loaded into the in-memory store for local runs and used as the reference
//! dataset by the integration tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCategory {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedVariant {
    pub name: &'static str,
    pub sku: &'static str,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedProduct {
    pub code: &'static str,
    pub price: Decimal,
    pub category_code: &'static str,
    pub variants: Vec<SeedVariant>,
}

/// Categories first, then products referencing them by code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedCatalog {
    pub categories: Vec<SeedCategory>,
    pub products: Vec<SeedProduct>,
}

fn product(code: &'static str, price: Decimal, category_code: &'static str) -> SeedProduct {
    SeedProduct {
        code,
        price,
        category_code,
        variants: Vec::new(),
    }
}

/// Three categories, eight products; PROD001 carries one priced and two
/// price-inheriting variants.
pub fn demo_catalog() -> SeedCatalog {
    let mut prod001 = product("PROD001", dec!(10.99), "CLOTHING");
    prod001.variants = vec![
        SeedVariant {
            name: "Variant A",
            sku: "SKU001A",
            price: Some(dec!(11.99)),
        },
        SeedVariant {
            name: "Variant B",
            sku: "SKU001B",
            price: None,
        },
        SeedVariant {
            name: "Variant C",
            sku: "SKU001C",
            price: None,
        },
    ];

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
            SeedCategory {
                code: "SHOES",
                name: "Shoes",
            },
        ],
        products: vec![
            prod001,
            product("PROD002", dec!(12.49), "ACCESSORIES"),
            product("PROD003", dec!(8.75), "SHOES"),
            product("PROD004", dec!(15.00), "CLOTHING"),
            product("PROD005", dec!(22.99), "SHOES"),
            product("PROD006", dec!(5.50), "ACCESSORIES"),
            product("PROD007", dec!(18.20), "CLOTHING"),
            product("PROD008", dec!(9.99), "SHOES"),
        ],
    }
}
