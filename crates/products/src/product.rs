use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{ProductId, VariantId};

use crate::category::Category;
use crate::pricing::resolve_variant_price;

/// A catalog product, as read from storage with its relations loaded.
///
/// `price` is always present and positive. `category` is the referenced
/// category (non-owning); `variants` are owned and ordered by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub price: Decimal,
    pub category: Category,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Variants paired with their effective (inherited or own) price.
    pub fn priced_variants(&self) -> impl Iterator<Item = (&Variant, Decimal)> + '_ {
        self.variants
            .iter()
            .map(move |v| (v, v.effective_price(self.price)))
    }
}

/// A purchasable variant of a product.
///
/// `price: None` means "same as the product"; that value is never stored,
/// only resolved at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    pub sku: String,
    pub price: Option<Decimal>,
}

impl Variant {
    pub fn effective_price(&self, product_price: Decimal) -> Decimal {
        resolve_variant_price(product_price, self.price)
    }
}
