//! # Storefront API
//!
//! Service boundary for the storefront: orders, payments, catalog and
//! coupons.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront Services                             │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  OrderService  │  │ PaymentService │  │  ProductService            ││
//! │  │                │  │                │  │                            ││
//! │  │ • PlaceOrder   │  │ • Process      │  │ • Create / Update          ││
//! │  │ • GetOrder     │  │   Payment      │  │ • Deactivate               ││
//! │  │ • ListMyOrders │  │ • GetPayment   │  │ • Get / List               ││
//! │  │ • UpdateStatus │  │                │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐                                                    │
//! │  │ CouponService  │   every call: Principal ─► authorize ─► shop-db    │
//! │  │ • Create/Delete│               ─► view or ApiError                  │
//! │  │ • Get / List   │                                                    │
//! │  └────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! `shop.toml` in the working directory, overridden by environment variables:
//! - `SHOP_DATABASE_PATH` - SQLite file (default: ./shop.db)
//! - `SHOP_MAX_CONNECTIONS` - pool size (default: 5)
//! - `SHOP_TRANSACTION_TIMEOUT_MS` - bound per order/payment (default: 10000)
//! - `SHOP_LOG_LEVEL` - filter when `RUST_LOG` is unset
//! - `SHOP_ADMIN_EMAIL` - bootstrap administrator

pub mod config;
pub mod error;
pub mod services;
pub mod views;

use tracing_subscriber::EnvFilter;

pub use config::ShopConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use shop_db::Database;

/// Shared application state.
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `fallback`.
pub fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
