//! # Cart Pricing
//!
//! Turns a resolved cart into priced lines and an order total.
//!
//! ## Flow
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ validate_cart│───►│  price_cart  │───►│  subtotal    │───►│apply_discount│
//! │ shape only   │    │ active+stock │    │ Σ line totals│    │ floored at 0 │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! ## Duplicate Product Lines
//! A cart may list the same product more than once. Lines are kept as
//! separate order items, but stock is checked against the combined
//! quantity of every line for that product.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// One `{productId, quantity}` pair submitted at order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A cart line with its price frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

/// Result of pricing a whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: Money,
}

impl PricedCart {
    /// Order total once `discount` (if any) is taken off.
    pub fn total_with(&self, discount: Option<Money>) -> Money {
        match discount {
            Some(discount) => apply_discount(self.subtotal, discount),
            None => self.subtotal,
        }
    }
}

/// Checks the cart's shape before anything is looked up.
///
/// ## Rules
/// - At least one line, at most `MAX_CART_LINES`
/// - Every quantity in `1..=MAX_ITEM_QUANTITY`
pub fn validate_cart(lines: &[CartLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if lines.len() > MAX_CART_LINES {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_LINES,
        });
    }

    for line in lines {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product id".to_string(),
            }
            .into());
        }

        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if line.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
    }

    Ok(())
}

/// Prices a cart whose products have already been resolved.
///
/// `lines` pairs each product with the quantity of its cart line, in cart
/// order. Fails on the first inactive product, on the first product whose
/// stock cannot cover the combined quantity requested for it, or with
/// `AmountTooLarge` when a line total or the subtotal overflows.
pub fn price_cart(lines: &[(Product, i64)]) -> CoreResult<PricedCart> {
    let wanted = combined_quantities(lines.iter().map(|(p, qty)| (p.id.as_str(), *qty)));

    let mut priced = Vec::with_capacity(lines.len());
    for (product, quantity) in lines {
        if !product.is_active {
            return Err(CoreError::ProductInactive {
                name: product.name.clone(),
            });
        }

        let requested = wanted.get(product.id.as_str()).copied().unwrap_or(*quantity);
        if !product.has_stock_for(requested) {
            return Err(CoreError::InsufficientStock {
                sku: product.sku.clone(),
                available: product.stock,
                requested,
            });
        }

        let unit_price = product.price();
        let total_price = unit_price
            .checked_multiply_quantity(*quantity)
            .ok_or(CoreError::AmountTooLarge)?;
        priced.push(PricedLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: *quantity,
            unit_price,
            total_price,
        });
    }

    let subtotal = priced.iter().try_fold(Money::zero(), |acc, line| {
        acc.checked_add(line.total_price).ok_or(CoreError::AmountTooLarge)
    })?;

    Ok(PricedCart {
        lines: priced,
        subtotal,
    })
}

/// Takes `discount` off `subtotal`; the result never goes below zero.
///
/// ## Example
/// ```rust
/// use shop_core::money::Money;
/// use shop_core::pricing::apply_discount;
///
/// let total = apply_discount(Money::from_cents(2000), Money::from_cents(200));
/// assert_eq!(total.cents(), 1800);
/// ```
#[inline]
pub fn apply_discount(subtotal: Money, discount: Money) -> Money {
    subtotal.minus_floored(discount)
}

fn combined_quantities<'a>(lines: impl Iterator<Item = (&'a str, i64)>) -> HashMap<&'a str, i64> {
    let mut combined: HashMap<&str, i64> = HashMap::new();
    for (id, qty) in lines {
        *combined.entry(id).or_insert(0) += qty;
    }
    combined
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("PROD-{}", id.to_uppercase()),
            name: format!("Product {}", id),
            description: None,
            price_cents,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_price_single_line() {
        let cart = price_cart(&[(product("a", 1000, 10), 2)]).unwrap();
        assert_eq!(cart.subtotal.cents(), 2000);
        assert_eq!(cart.lines[0].unit_price.cents(), 1000);
        assert_eq!(cart.lines[0].total_price.cents(), 2000);
        assert_eq!(cart.total_with(None).cents(), 2000);
    }

    #[test]
    fn test_totals_with_discount() {
        let cart = price_cart(&[(product("a", 1000, 10), 2)]).unwrap();
        assert_eq!(cart.total_with(Some(Money::from_cents(200))).cents(), 1800);
        assert_eq!(cart.total_with(Some(Money::from_cents(5000))), Money::zero());
    }

    #[test]
    fn test_inactive_product_rejected() {
        let mut p = product("a", 1000, 10);
        p.is_active = false;
        let err = price_cart(&[(p, 1)]).unwrap_err();
        assert!(matches!(err, CoreError::ProductInactive { .. }));
    }

    #[test]
    fn test_insufficient_stock() {
        let err = price_cart(&[(product("a", 1000, 1), 2)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 1, requested: 2, .. }
        ));
    }

    #[test]
    fn test_duplicate_lines_checked_against_combined_quantity() {
        let p = product("a", 500, 5);
        // 3 + 3 > 5 even though each line fits on its own
        let err = price_cart(&[(p.clone(), 3), (p.clone(), 3)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 5, requested: 6, .. }
        ));

        let cart = price_cart(&[(p.clone(), 2), (p, 3)]).unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.subtotal.cents(), 2500);
    }

    #[test]
    fn test_line_total_overflow_rejected() {
        let err = price_cart(&[(product("a", i64::MAX / 2, 10), 3)]).unwrap_err();
        assert!(matches!(err, CoreError::AmountTooLarge));
    }

    #[test]
    fn test_subtotal_overflow_rejected() {
        // Each line fits on its own, the sum does not.
        let cart = [
            (product("a", i64::MAX / 2, 10), 1),
            (product("b", i64::MAX / 2, 10), 1),
            (product("c", i64::MAX / 2, 10), 1),
        ];
        assert!(matches!(price_cart(&cart), Err(CoreError::AmountTooLarge)));
    }

    #[test]
    fn test_full_cart_at_price_ceiling_fits() {
        let cart: Vec<(Product, i64)> = (0..MAX_CART_LINES)
            .map(|i| {
                let p = product(&format!("p{}", i), crate::MAX_PRICE_CENTS, MAX_ITEM_QUANTITY);
                (p, MAX_ITEM_QUANTITY)
            })
            .collect();
        let priced = price_cart(&cart).unwrap();
        assert_eq!(
            priced.subtotal.cents(),
            crate::MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * MAX_CART_LINES as i64
        );
    }

    #[test]
    fn test_validate_cart() {
        assert!(matches!(validate_cart(&[]), Err(CoreError::EmptyCart)));
        assert!(validate_cart(&[CartLine::new("a", 1)]).is_ok());
        assert!(matches!(
            validate_cart(&[CartLine::new("a", 0)]),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            validate_cart(&[CartLine::new("a", 1000)]),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        let too_many: Vec<CartLine> = (0..=MAX_CART_LINES)
            .map(|i| CartLine::new(format!("p{}", i), 1))
            .collect();
        assert!(matches!(
            validate_cart(&too_many),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_cart_line_wire_shape() {
        let line: CartLine =
            serde_json::from_str(r#"{"productId":"p-1","quantity":2}"#).unwrap();
        assert_eq!(line, CartLine::new("p-1", 2));
    }

    proptest! {
        #[test]
        fn prop_total_never_negative(subtotal in 0i64..10_000_000, discount in 0i64..20_000_000) {
            let total = apply_discount(Money::from_cents(subtotal), Money::from_cents(discount));
            prop_assert!(!total.is_negative());
            prop_assert!(total.cents() <= subtotal);
        }

        #[test]
        fn prop_subtotal_is_sum_of_lines(
            lines in proptest::collection::vec((0i64..100_000, 1i64..=MAX_ITEM_QUANTITY), 1..20)
        ) {
            let cart: Vec<(Product, i64)> = lines
                .iter()
                .enumerate()
                .map(|(i, (price, qty))| (product(&format!("p{}", i), *price, *qty), *qty))
                .collect();

            let priced = price_cart(&cart).unwrap();
            let expected: i64 = lines.iter().map(|(price, qty)| price * qty).sum();
            prop_assert_eq!(priced.subtotal.cents(), expected);
            for line in &priced.lines {
                prop_assert_eq!(
                    Some(line.total_price),
                    line.unit_price.checked_multiply_quantity(line.quantity)
                );
            }
        }

        #[test]
        fn prop_percentage_discount_within_subtotal(subtotal in 0i64..10_000_000, bps in 1i64..=10_000) {
            let discount = Money::from_cents(subtotal).percentage(bps);
            prop_assert!(discount.cents() >= 0);
            prop_assert!(discount.cents() <= subtotal);
        }
    }
}
