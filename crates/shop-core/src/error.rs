//! # Error Types
//!
//! Domain-specific error types for shop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shop-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── CouponRejection  - Why a coupon cannot be applied (coupon.rs)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shop-db errors (separate crate)                                       │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  shop-api errors (app)                                                 │
//! │  └── ApiError         - What clients see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::coupon::CouponRejection;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Any of these raised inside an order or payment transaction aborts the
/// whole transaction.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The user exists but has not been approved (or was rejected).
    #[error("User {user_id} is {status}, only active users can place orders")]
    UserNotActive { user_id: String, status: String },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product {name} is not available")]
    ProductInactive { name: String },

    /// Insufficient stock to complete an order.
    ///
    /// ## User Workflow
    /// ```text
    /// Place order (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "MUG-01", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    #[error("Order must contain at least one item")]
    EmptyCart,

    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Line total or subtotal does not fit in i64 cents.
    #[error("Order amount is too large")]
    AmountTooLarge,

    /// Coupon lookup by code on the admin read path.
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Unknown coupon code submitted with an order.
    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),

    #[error("Coupon rejected: {0}")]
    CouponRejected(#[from] CouponRejection),

    /// Coupon cannot be deleted while redemptions still reference it.
    #[error("Coupon {code} has been redeemed and cannot be deleted")]
    CouponInUse { code: String },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("No payment found for order {0}")]
    PaymentNotFound(String),

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Paying an order twice
    /// - Paying a cancelled order
    #[error("Order {order_id} is {current_status}, expected PENDING")]
    InvalidOrderState {
        order_id: String,
        current_status: String,
    },

    #[error("Order status cannot change from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid card: {reason}")]
    InvalidCard { reason: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
