//! Error types for the Storefront API.
//!
//! ## Mapping
//! ```text
//! ┌───────────────────────────────┬──────────────────┬────────┐
//! │ Source                        │ ErrorCode        │ Status │
//! ├───────────────────────────────┼──────────────────┼────────┤
//! │ *NotFound                     │ NOT_FOUND        │ 404    │
//! │ inactive user/product, stock, │ BAD_REQUEST      │ 400    │
//! │ coupon, card, status value    │                  │        │
//! │ ValidationError               │ VALIDATION_FAILED│ 400    │
//! │ Forbidden                     │ FORBIDDEN        │ 403    │
//! │ coupon exhausted, coupon in   │ CONFLICT         │ 409    │
//! │ use, order not PENDING        │                  │        │
//! │ busy / timeout / pool         │ TRANSIENT        │ 409    │
//! │ anything else                 │ INTERNAL         │ 500    │
//! └───────────────────────────────┴──────────────────┴────────┘
//! ```
//! INTERNAL errors are logged in full and reach the client as a generic
//! message.

use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

use shop_core::{CoreError, CouponRejection};
use shop_db::DbError;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Stable, machine-readable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    NotFound,
    BadRequest,
    ValidationFailed,
    Forbidden,
    Conflict,
    /// Resubmitting the same request may succeed.
    Transient,
    Internal,
}

impl ErrorCode {
    /// HTTP-equivalent status.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::BadRequest | ErrorCode::ValidationFailed => 400,
            ErrorCode::Forbidden => 403,
            ErrorCode::Conflict | ErrorCode::Transient => 409,
            ErrorCode::Internal => 500,
        }
    }
}

/// What a client sees when an operation fails.
#[derive(Debug, Clone, Serialize, TS, thiserror::Error)]
#[error("{code:?}: {message}")]
#[ts(export)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::Transient
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::UserNotFound(_)
            | CoreError::ProductNotFound(_)
            | CoreError::CouponNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::PaymentNotFound(_) => ErrorCode::NotFound,

            CoreError::Forbidden(_) => ErrorCode::Forbidden,

            CoreError::Validation(_) => ErrorCode::ValidationFailed,

            CoreError::CouponRejected(CouponRejection::RedemptionLimitReached)
            | CoreError::CouponInUse { .. }
            | CoreError::InvalidOrderState { .. } => ErrorCode::Conflict,

            CoreError::UserNotActive { .. }
            | CoreError::ProductInactive { .. }
            | CoreError::InsufficientStock { .. }
            | CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::AmountTooLarge
            | CoreError::InvalidCoupon(_)
            | CoreError::CouponRejected(_)
            | CoreError::InvalidStatusTransition { .. }
            | CoreError::InvalidCard { .. } => ErrorCode::BadRequest,
        };

        ApiError::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(err) => err.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            err if err.is_retryable() => {
                warn!(error = %err, "Transient database failure");
                ApiError::new(
                    ErrorCode::Transient,
                    "The store is busy, please retry the request",
                )
            }
            err => {
                error!(error = %err, "Internal database failure");
                ApiError::new(ErrorCode::Internal, INTERNAL_MESSAGE)
            }
        }
    }
}

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;
