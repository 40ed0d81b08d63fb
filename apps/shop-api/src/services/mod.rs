//! Service implementations.
//!
//! Each service takes the caller's [`Principal`](shop_core::Principal),
//! checks what the caller may do, delegates to `shop-db` and projects the
//! result into a view.

pub mod coupon_service;
pub mod order_service;
pub mod payment_service;
pub mod product_service;
