//! # shop-db: Database Layer for the Storefront
//!
//! SQLite storage through sqlx, plus the Order and Payment engines. Each
//! engine operation is one database transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  shop-api service (place_order)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shop-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ PaymentRepo   │    │ 001_initial  │  │   │
//! │  │   │ tx timeouts   │    │ Product/Coupon│    │   _schema    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_db::{Database, DbConfig, PlaceOrderRequest};
//!
//! let db = Database::new(DbConfig::new("shop.db")).await?;
//! let order = db.orders().place_order(request).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::coupon::{CouponInput, CouponRepository};
pub use repository::order::{OrderRepository, PlaceOrderRequest};
pub use repository::payment::PaymentRepository;
pub use repository::product::{ProductInput, ProductRepository};
pub use repository::user::{NewUser, UserRepository};
