//! # Validation Module
//!
//! Input validation for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service boundary (shop-api)                                  │
//! │  ├── Request shape (ids, status strings)                               │
//! │  └── THIS MODULE: field rules before any transaction opens             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engines (shop-db)                                            │
//! │  └── Business rules that need current state (stock, coupons)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (price_cents >= 0)                      │
//! │  ├── UNIQUE (sku), UNIQUE (code)                                       │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shop_core::validation::{validate_coupon_code, validate_product_name};
//!
//! validate_product_name("Ceramic Mug").unwrap();
//! assert_eq!(validate_coupon_code(" save10 ").unwrap(), "SAVE10");
//! ```

use chrono::{DateTime, Utc};

use crate::coupon::normalize_code;
use crate::error::ValidationError;
use crate::types::DiscountType;
use crate::{MAX_ADDRESS_LEN, MAX_PRICE_CENTS, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted card brand label.
pub const MAX_CARD_BRAND_LEN: usize = 30;

/// Longest accepted coupon code.
pub const MAX_COUPON_CODE_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use shop_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Ceramic Mug").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an optional shipping or billing address.
///
/// Blank input is treated as absent. Returns the trimmed address.
pub fn validate_address(field: &str, address: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(address) = address.map(str::trim).filter(|a| !a.is_empty()) else {
        return Ok(None);
    };

    if address.chars().count() > MAX_ADDRESS_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ADDRESS_LEN,
        });
    }

    Ok(Some(address.to_string()))
}

/// Validates a card brand label such as `VISA`. Returns it trimmed.
pub fn validate_card_brand(brand: &str) -> ValidationResult<String> {
    let brand = brand.trim();

    if brand.is_empty() {
        return Err(ValidationError::Required {
            field: "card brand".to_string(),
        });
    }

    if brand.chars().count() > MAX_CARD_BRAND_LEN {
        return Err(ValidationError::TooLong {
            field: "card brand".to_string(),
            max: MAX_CARD_BRAND_LEN,
        });
    }

    Ok(brand.to_string())
}

/// Validates and normalizes a coupon code.
///
/// ## Rules
/// - Trimmed, then uppercased
/// - Must not be empty, at most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use shop_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code("welcome-10").unwrap(), "WELCOME-10");
/// assert!(validate_coupon_code("two words").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = normalize_code(code);

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    if code.chars().count() > MAX_COUPON_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: MAX_COUPON_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code)
}

/// Validates a user email. Only the shape is checked.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.tld".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be in `0..=MAX_PRICE_CENTS`
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use shop_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // $10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// assert!(validate_price_cents(i64::MAX / 2).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level set by an administrator.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(())
}

/// Validates a coupon's discount value for its type.
///
/// ## Rules
/// - Must be positive
/// - Percentages (basis points) may not exceed 10000 (100%)
pub fn validate_discount(discount_type: DiscountType, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "discount value".to_string(),
        });
    }

    if discount_type == DiscountType::Percentage && value > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "discount percentage (bps)".to_string(),
            min: 1,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates an optional redemption cap.
pub fn validate_max_redemptions(max: Option<i64>) -> ValidationResult<()> {
    match max {
        Some(n) if n <= 0 => Err(ValidationError::MustBePositive {
            field: "max redemptions".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates a validity window; when both ends are set, `from <= to`.
pub fn validate_coupon_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(ValidationError::InvalidFormat {
            field: "validity window".to_string(),
            reason: "valid_from must not be after valid_to".to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Ceramic Mug").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_address() {
        assert_eq!(validate_address("shipping address", None).unwrap(), None);
        assert_eq!(validate_address("shipping address", Some("  ")).unwrap(), None);
        assert_eq!(
            validate_address("shipping address", Some(" 1 Main St ")).unwrap(),
            Some("1 Main St".to_string())
        );
        assert!(validate_address("billing address", Some(&"x".repeat(501))).is_err());
    }

    #[test]
    fn test_validate_card_brand() {
        assert_eq!(validate_card_brand(" VISA ").unwrap(), "VISA");
        assert!(validate_card_brand("").is_err());
        assert!(validate_card_brand(&"B".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert_eq!(validate_coupon_code("save_10").unwrap(), "SAVE_10");
        assert!(validate_coupon_code("").is_err());
        assert!(validate_coupon_code("10% OFF").is_err());
        assert!(validate_coupon_code(&"C".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("Ana@Shop.io").unwrap(), "ana@shop.io");
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@shop.io").is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(DiscountType::Percentage, 1000).is_ok());
        assert!(validate_discount(DiscountType::Percentage, 10_000).is_ok());
        assert!(validate_discount(DiscountType::Percentage, 10_001).is_err());
        assert!(validate_discount(DiscountType::FixedAmount, 50_000).is_ok());
        assert!(validate_discount(DiscountType::FixedAmount, 0).is_err());
    }

    #[test]
    fn test_validate_coupon_limits() {
        assert!(validate_max_redemptions(None).is_ok());
        assert!(validate_max_redemptions(Some(1)).is_ok());
        assert!(validate_max_redemptions(Some(0)).is_err());

        let now = Utc::now();
        assert!(validate_coupon_window(Some(now), Some(now)).is_ok());
        assert!(validate_coupon_window(None, Some(now)).is_ok());
        assert!(validate_coupon_window(Some(now), Some(now - Duration::days(1))).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-5).is_err());
        assert!(validate_stock(MAX_STOCK).is_ok());
    }

    #[test]
    fn test_amounts_above_ceiling_rejected() {
        assert!(matches!(
            validate_price_cents(i64::MAX / 2),
            Err(ValidationError::OutOfRange { max, .. }) if max == MAX_PRICE_CENTS
        ));
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(matches!(
            validate_stock(MAX_STOCK + 1),
            Err(ValidationError::OutOfRange { max, .. }) if max == MAX_STOCK
        ));
    }
}
