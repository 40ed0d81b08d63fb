//! # shop-core: Pure Business Logic for the Storefront
//!
//! This crate is the **heart** of the order-fulfillment backend. It contains
//! the pricing, coupon and payment rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Access Guard (external collaborator)               │   │
//! │  │           verified Principal { user_id, role }                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shop-api (service boundary)                     │   │
//! │  │    place_order, process_payment, get_payment, update_status     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shop-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐  │   │
//! │  │  │  types  │ │ pricing │ │ coupon  │ │ payment │ │  access  │  │   │
//! │  │  │ Product │ │  Cart   │ │evaluate │ │  card   │ │ owner or │  │   │
//! │  │  │  Order  │ │ totals  │ │discount │ │  token  │ │  admin   │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shop-db (Database Layer)                     │   │
//! │  │        SQLite transactions: Order Engine, Payment Engine        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Coupon, Order, Payment, User)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Cart pricing and order totals
//! - [`coupon`] - Coupon eligibility and discount computation
//! - [`payment`] - Simulated card authorization and tokenization
//! - [`access`] - Owner-or-admin authorization decision
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shop_core::money::Money;
//! use shop_core::pricing::apply_discount;
//!
//! let subtotal = Money::from_cents(2000); // $20.00
//! let discount = Money::from_cents(5000); // $50.00 fixed coupon
//!
//! // Totals never go below zero
//! assert_eq!(apply_discount(subtotal, discount), Money::zero());
//! ```

pub mod access;
pub mod coupon;
pub mod error;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{is_owner_or_admin, Principal};
pub use coupon::{CouponRejection, RedemptionContext};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{CartLine, PricedCart, PricedLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Catches fat-finger orders (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a shipping or billing address.
pub const MAX_ADDRESS_LEN: usize = 500;

/// Highest catalog price, in cents ($1,000,000.00).
///
/// A full cart at this price still fits in i64 cents.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Highest stock level an administrator may set.
pub const MAX_STOCK: i64 = 1_000_000;
