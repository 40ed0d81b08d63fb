//! # Repository Module
//!
//! Database repositories for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Engines                             │
//! │                                                                         │
//! │  shop-api service                                                      │
//! │       │                                                                 │
//! │       │  db.orders().place_order(request)                              │
//! │       ▼                                                                 │
//! │  OrderRepository (Order Engine)          PaymentRepository             │
//! │  └── one transaction:                    (Payment Engine)              │
//! │      user ─► products ─► price ─►        └── one transaction:          │
//! │      decrement ─► coupon ─► insert           order ─► card ─► insert   │
//! │       │                                       │                        │
//! │       │ pub(crate) helpers on &mut SqliteConnection                    │
//! │       ▼                                       ▼                        │
//! │  UserRepository  ProductRepository  CouponRepository                   │
//! │                                                                         │
//! │  Helpers take a connection, never the pool, so they run inside the     │
//! │  caller's transaction.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts and bootstrap admin
//! - [`ProductRepository`](product::ProductRepository) - Catalog Store
//! - [`CouponRepository`](coupon::CouponRepository) - Coupon Store
//! - [`OrderRepository`](order::OrderRepository) - Order Engine and order reads
//! - [`PaymentRepository`](payment::PaymentRepository) - Payment Engine

pub mod coupon;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;
