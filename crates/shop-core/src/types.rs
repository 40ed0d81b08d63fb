//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  user_id        │   │  order_id (FK)  │       │
//! │  │  price_cents    │   │  status         │   │  amount_cents   │       │
//! │  │  stock          │   │  total_cents    │   │  card_last4     │       │
//! │  └─────────────────┘   │  items[]        │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Coupon       │   │CouponRedemption │   │      User       │       │
//! │  │  code (UPPER)   │   │  coupon_id      │   │  role, status   │       │
//! │  │  discount_type  │   │  user_id        │   │                 │       │
//! │  │  max_redemptions│   │  order_id       │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID `id` used for relations. Products and coupons
//! also carry a human-readable business key (`sku`, `code`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum UserRole {
    User,
    Admin,
}

/// Approval state of an account. Registration and approval happen outside
/// this system; only `Active` users may place orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum UserStatus {
    Pending,
    Active,
    Rejected,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "PENDING",
            UserStatus::Active => "ACTIVE",
            UserStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit, e.g. `PROD-1A2B3C4D`.
    pub sku: String,

    pub name: String,

    pub description: Option<String>,

    /// Price in cents. Never negative.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Inactive products stay in the table (soft delete) so historical
    /// order items keep their reference.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if `quantity` units can be taken from current stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Coupon
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum DiscountType {
    /// `discount_value` is in basis points (1000 = 10.00%).
    Percentage,
    /// `discount_value` is in cents.
    FixedAmount,
}

impl FromStr for DiscountType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERCENTAGE" => Ok(DiscountType::Percentage),
            "FIXED_AMOUNT" => Ok(DiscountType::FixedAmount),
            _ => Err(ValidationError::NotAllowed {
                field: "discount type".to_string(),
                allowed: vec!["PERCENTAGE".to_string(), "FIXED_AMOUNT".to_string()],
            }),
        }
    }
}

/// A discount coupon. Immutable after creation except through deletion.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    pub id: String,

    /// Unique, always stored uppercase.
    pub code: String,

    pub description: Option<String>,

    pub discount_type: DiscountType,

    /// Fixed-point value with scale 2: cents for `FixedAmount`, basis
    /// points for `Percentage`. Always > 0.
    pub discount_value: i64,

    /// Only usable by users with no prior orders.
    pub new_user_only: bool,

    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,

    #[ts(as = "Option<String>")]
    pub valid_to: Option<DateTime<Utc>>,

    /// Maximum successful orders using this coupon. `None` = unlimited.
    pub max_redemptions: Option<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Record that a coupon was spent on a specific order. Never updated.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CouponRedemption {
    pub id: String,
    pub coupon_id: String,
    pub user_id: String,
    pub order_id: String,
    #[ts(as = "String")]
    pub redeemed_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ## State Machine
/// ```text
///                 process_payment
///   ┌─────────┐ ─────────────────► ┌──────┐  admin  ┌─────────┐  admin  ┌───────────┐
///   │ PENDING │                    │ PAID │ ──────► │ SHIPPED │ ──────► │ DELIVERED │
///   └────┬────┘                    └──┬───┘         └─────────┘         └───────────┘
///        │ admin                      │ admin
///        ▼                            ▼
///   ┌───────────┐ ◄───────────────────┘
///   │ CANCELLED │
///   └───────────┘
/// ```
/// `PENDING → PAID` belongs to the payment engine only, so a PAID order
/// always has its payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether the administrative status path may move an order from `self`
    /// to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Paid, OrderStatus::Shipped)
                | (OrderStatus::Paid, OrderStatus::Cancelled)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }

    /// Like [`can_transition_to`](Self::can_transition_to), as a `Result`.
    pub fn check_transition(&self, next: OrderStatus) -> CoreResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order. Created atomically with its items by order placement.
///
/// ## Total Invariant
/// `total_amount_cents == max(0, Σ items.total_price_cents − discount_cents)`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    /// Sum of item totals before any coupon.
    pub subtotal_cents: i64,
    /// Discount computed by the applied coupon (may exceed the subtotal).
    pub discount_cents: i64,
    pub total_amount_cents: i64,
    pub coupon_id: Option<String>,
    /// Code of the applied coupon, joined in on reads.
    pub coupon_code: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<OrderItem>,
}

impl Order {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Sum of the item totals as stored on the items.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(OrderItem::total_price).sum()
    }
}

/// A line item in an order.
/// Uses the snapshot pattern: name and unit price are frozen at purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Position of the line in the submitted cart (0-based).
    pub line_no: i64,
    pub product_id: String,
    /// Product name at time of purchase (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at time of purchase (frozen).
    pub unit_price_cents: i64,
    /// `unit_price_cents × quantity`.
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentMethod {
    Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentStatus {
    Successful,
    Failed,
}

/// A payment towards an order. Immutable once written.
///
/// Only the tokenized card reference is kept: last 4 digits, brand and an
/// opaque token. The raw card number never reaches this struct.
#[derive(Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub processed_at: DateTime<Utc>,
    pub card_last4: String,
    pub card_brand: String,
    pub card_token: String,
    pub note: Option<String>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// Token stays out of log lines.
impl fmt::Debug for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payment")
            .field("id", &self.id)
            .field("order_id", &self.order_id)
            .field("payment_method", &self.payment_method)
            .field("payment_status", &self.payment_status)
            .field("amount_cents", &self.amount_cents)
            .field("processed_at", &self.processed_at)
            .field("card_last4", &self.card_last4)
            .field("card_brand", &self.card_brand)
            .field("card_token", &"<redacted>")
            .field("note", &self.note)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" PAID ".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert!("REFUNDED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_admin_transitions() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Shipped));
        assert!(Paid.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Delivered));

        // Payment engine owns PENDING -> PAID
        assert!(!Pending.can_transition_to(Paid));
        // No going back
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Shipped));
        assert!(!Cancelled.can_transition_to(Pending));
        // No self loops
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_check_transition_error() {
        let err = OrderStatus::Delivered
            .check_transition(OrderStatus::Pending)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order status cannot change from DELIVERED to PENDING"
        );
    }

    #[test]
    fn test_discount_type_parse() {
        assert_eq!(
            "percentage".parse::<DiscountType>().unwrap(),
            DiscountType::Percentage
        );
        assert_eq!(
            "FIXED_AMOUNT".parse::<DiscountType>().unwrap(),
            DiscountType::FixedAmount
        );
        assert!("BOGO".parse::<DiscountType>().is_err());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&DiscountType::FixedAmount).unwrap(),
            "\"FIXED_AMOUNT\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Successful).unwrap(),
            "\"SUCCESSFUL\""
        );
    }

    #[test]
    fn test_payment_debug_redacts_token() {
        let payment = Payment {
            id: "p-1".to_string(),
            order_id: "o-1".to_string(),
            payment_method: PaymentMethod::Card,
            payment_status: PaymentStatus::Successful,
            amount_cents: 2000,
            processed_at: Utc::now(),
            card_last4: "3333".to_string(),
            card_brand: "VISA".to_string(),
            card_token: "tok_secret".to_string(),
            note: None,
        };
        let debug = format!("{:?}", payment);
        assert!(debug.contains("3333"));
        assert!(!debug.contains("tok_secret"));
    }
}
