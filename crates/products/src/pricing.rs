//! Variant price inheritance.

use rust_decimal::Decimal;

/// Effective price of a variant.
///
/// A variant without its own price inherits the owning product's price. The
/// result is one of the inputs, untouched: no rounding, scale preserved.
pub fn resolve_variant_price(product_price: Decimal, variant_price: Option<Decimal>) -> Decimal {
    variant_price.unwrap_or(product_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_variant_price_inherits_product_price() {
        assert_eq!(resolve_variant_price(dec!(9.99), None), dec!(9.99));
    }

    #[test]
    fn own_variant_price_wins() {
        assert_eq!(resolve_variant_price(dec!(9.99), Some(dec!(7.99))), dec!(7.99));
    }

    #[test]
    fn scale_is_preserved() {
        let price = resolve_variant_price(dec!(15.00), None);
        assert_eq!(price.scale(), 2);
        assert_eq!(price.to_string(), "15.00");
    }

    proptest! {
        #[test]
        fn result_is_always_one_of_the_inputs(
            product_cents in 1i64..10_000_000,
            variant_cents in proptest::option::of(1i64..10_000_000),
        ) {
            let product = Decimal::new(product_cents, 2);
            let variant = variant_cents.map(|c| Decimal::new(c, 2));
            let resolved = resolve_variant_price(product, variant);
            match variant {
                Some(v) => {
                    prop_assert_eq!(resolved, v);
                    prop_assert_eq!(resolved.mantissa(), v.mantissa());
                }
                None => {
                    prop_assert_eq!(resolved, product);
                    prop_assert_eq!(resolved.scale(), product.scale());
                }
            }
        }
    }
}
