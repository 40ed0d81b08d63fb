//! # Coupon Eligibility
//!
//! Decides whether a coupon may be applied to a user's cart at a given
//! instant, and how much it takes off.
//!
//! ## Evaluation Order
//! ```text
//!   coupon + context + subtotal + now
//!                │
//!                ▼
//!   now < valid_from ? ──yes──► NotYetValid
//!                │
//!   now > valid_to ? ───yes──► Expired
//!                │
//!   new_user_only && prior_orders > 0 ? ──yes──► NewUserOnlyViolation
//!                │
//!   redemptions >= max_redemptions ? ───yes──► RedemptionLimitReached
//!                │
//!                ▼
//!        discount amount (not capped)
//! ```
//!
//! Everything here is pure: the caller gathers the context (prior order
//! count, redemptions of *this* coupon) inside its own transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;
use crate::types::{Coupon, DiscountType};

/// Why a coupon cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponRejection {
    #[error("coupon is not valid yet")]
    NotYetValid,

    #[error("coupon has expired")]
    Expired,

    #[error("coupon is only available to new customers")]
    NewUserOnlyViolation,

    #[error("coupon redemption limit reached")]
    RedemptionLimitReached,
}

/// State the evaluation depends on, read by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedemptionContext {
    /// Orders the user has placed before, any status.
    pub prior_orders: i64,
    /// Redemptions recorded for this coupon.
    pub redemptions: i64,
}

impl Coupon {
    /// Discount this coupon grants on `subtotal`, ignoring eligibility.
    ///
    /// Percentage values are basis points, rounded half up to the cent.
    /// Fixed amounts are returned as-is, even when larger than the subtotal;
    /// flooring happens when the order total is computed.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        match self.discount_type {
            DiscountType::Percentage => subtotal.percentage(self.discount_value),
            DiscountType::FixedAmount => Money::from_cents(self.discount_value),
        }
    }

    /// Checks that `now` falls inside the coupon's validity window.
    /// Both ends are inclusive.
    pub fn check_window(&self, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        match (self.valid_from, self.valid_to) {
            (Some(from), _) if now < from => Err(CouponRejection::NotYetValid),
            (_, Some(to)) if now > to => Err(CouponRejection::Expired),
            _ => Ok(()),
        }
    }
}

/// Evaluates `coupon` for a cart of `subtotal` at `now`.
///
/// Returns the discount amount, or the first rule that rejects the coupon.
pub fn evaluate(
    coupon: &Coupon,
    ctx: RedemptionContext,
    subtotal: Money,
    now: DateTime<Utc>,
) -> Result<Money, CouponRejection> {
    coupon.check_window(now)?;

    if coupon.new_user_only && ctx.prior_orders > 0 {
        return Err(CouponRejection::NewUserOnlyViolation);
    }

    if let Some(max) = coupon.max_redemptions {
        if ctx.redemptions >= max {
            return Err(CouponRejection::RedemptionLimitReached);
        }
    }

    Ok(coupon.discount_for(subtotal))
}

/// Canonical form of a coupon code: trimmed and uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(discount_type: DiscountType, value: i64) -> Coupon {
        Coupon {
            id: "c-1".to_string(),
            code: "SAVE".to_string(),
            description: None,
            discount_type,
            discount_value: value,
            new_user_only: false,
            valid_from: None,
            valid_to: None,
            max_redemptions: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage_discount() {
        let c = coupon(DiscountType::Percentage, 1000);
        let discount = evaluate(&c, RedemptionContext::default(), Money::from_cents(2000), Utc::now());
        assert_eq!(discount, Ok(Money::from_cents(200)));
    }

    #[test]
    fn test_fixed_discount_not_capped() {
        let c = coupon(DiscountType::FixedAmount, 5000);
        let discount = evaluate(&c, RedemptionContext::default(), Money::from_cents(2000), Utc::now());
        assert_eq!(discount, Ok(Money::from_cents(5000)));
    }

    #[test]
    fn test_window() {
        let now = Utc::now();

        let mut c = coupon(DiscountType::FixedAmount, 100);
        c.valid_from = Some(now + Duration::hours(1));
        assert_eq!(
            evaluate(&c, RedemptionContext::default(), Money::from_cents(1000), now),
            Err(CouponRejection::NotYetValid)
        );

        let mut c = coupon(DiscountType::FixedAmount, 100);
        c.valid_to = Some(now - Duration::seconds(1));
        assert_eq!(
            evaluate(&c, RedemptionContext::default(), Money::from_cents(1000), now),
            Err(CouponRejection::Expired)
        );

        // Boundaries are inclusive
        let mut c = coupon(DiscountType::FixedAmount, 100);
        c.valid_from = Some(now);
        c.valid_to = Some(now);
        assert!(c.check_window(now).is_ok());
        assert_eq!(
            c.check_window(now - Duration::seconds(1)),
            Err(CouponRejection::NotYetValid)
        );
        assert_eq!(c.check_window(now + Duration::seconds(1)), Err(CouponRejection::Expired));
        assert!(evaluate(&c, RedemptionContext::default(), Money::from_cents(1000), now).is_ok());
    }

    #[test]
    fn test_new_user_only() {
        let mut c = coupon(DiscountType::Percentage, 1000);
        c.new_user_only = true;

        let fresh = RedemptionContext { prior_orders: 0, redemptions: 0 };
        assert!(evaluate(&c, fresh, Money::from_cents(1000), Utc::now()).is_ok());

        let returning = RedemptionContext { prior_orders: 1, redemptions: 0 };
        assert_eq!(
            evaluate(&c, returning, Money::from_cents(1000), Utc::now()),
            Err(CouponRejection::NewUserOnlyViolation)
        );
    }

    #[test]
    fn test_redemption_limit() {
        let mut c = coupon(DiscountType::FixedAmount, 100);
        c.max_redemptions = Some(2);

        let under = RedemptionContext { prior_orders: 5, redemptions: 1 };
        assert!(evaluate(&c, under, Money::from_cents(1000), Utc::now()).is_ok());

        let at = RedemptionContext { prior_orders: 5, redemptions: 2 };
        assert_eq!(
            evaluate(&c, at, Money::from_cents(1000), Utc::now()),
            Err(CouponRejection::RedemptionLimitReached)
        );
    }

    #[test]
    fn test_window_checked_before_limits() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::FixedAmount, 100);
        c.valid_to = Some(now - Duration::days(1));
        c.new_user_only = true;
        c.max_redemptions = Some(1);

        let ctx = RedemptionContext { prior_orders: 3, redemptions: 1 };
        assert_eq!(
            evaluate(&c, ctx, Money::from_cents(1000), now),
            Err(CouponRejection::Expired)
        );
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  save10 "), "SAVE10");
        assert_eq!(normalize_code("Welcome"), "WELCOME");
    }
}
