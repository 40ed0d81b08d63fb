//! # Payment Repository (Payment Engine)
//!
//! Charges a pending order with the simulated card processor.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                process_payment: ONE transaction                         │
//! │                                                                         │
//! │  load order ─────────────► OrderNotFound                               │
//! │       │                                                                 │
//! │  owner or admin? ────────► Forbidden                                   │
//! │       │                                                                 │
//! │  status == PENDING? ─────► InvalidOrderState  (no double payment)      │
//! │       │                                                                 │
//! │  authorize test card ────► InvalidCard        (order stays PENDING)    │
//! │       │                                                                 │
//! │  INSERT payment (last4, brand, token; never the number)                │
//! │  UPDATE orders SET status = 'PAID' WHERE status = 'PENDING'            │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The payment row and the status flip commit together or not at all.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::order::fetch_order;
use crate::error::{DbError, DbResult};
use crate::pool::bounded;
use shop_core::payment::{authorize_test_card, generate_card_token, SIMULATED_PAYMENT_NOTE};
use shop_core::{CoreError, OrderStatus, Payment, PaymentMethod, PaymentStatus, Principal};

const PAYMENT_COLUMNS: &str = "id, order_id, payment_method, payment_status, amount_cents, \
     processed_at, card_last4, card_brand, card_token, note";

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
    transaction_timeout: Duration,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool, transaction_timeout: Duration) -> Self {
        PaymentRepository {
            pool,
            transaction_timeout,
        }
    }

    /// Pays a pending order on behalf of `caller` and marks it PAID.
    pub async fn process_payment(
        &self,
        order_id: &str,
        card_number: &str,
        card_brand: &str,
        caller: &Principal,
    ) -> DbResult<Payment> {
        debug!(order_id = %order_id, caller = %caller.user_id, "Processing payment");

        let result = bounded(
            "process_payment",
            self.transaction_timeout,
            self.process_payment_tx(order_id, card_number, card_brand, caller),
        )
        .await;

        match &result {
            Ok(payment) => info!(
                order_id = %order_id,
                payment_id = %payment.id,
                amount = %payment.amount(),
                card_last4 = %payment.card_last4,
                "Payment processed, order marked PAID"
            ),
            Err(DbError::Domain(err)) => {
                warn!(order_id = %order_id, error = %err, "Payment rejected")
            }
            Err(_) => {}
        }

        result
    }

    async fn process_payment_tx(
        &self,
        order_id: &str,
        card_number: &str,
        card_brand: &str,
        caller: &Principal,
    ) -> DbResult<Payment> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let order = fetch_order(&mut tx, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        caller.require_owner_or_admin(&order.user_id)?;

        if order.status != OrderStatus::Pending {
            return Err(invalid_state(order_id, order.status).into());
        }

        let card = authorize_test_card(card_number, card_brand)?;
        let now = Utc::now();

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            payment_method: PaymentMethod::Card,
            payment_status: PaymentStatus::Successful,
            amount_cents: order.total_amount_cents,
            processed_at: now,
            card_last4: card.last4,
            card_brand: card.brand,
            card_token: generate_card_token(),
            note: Some(SIMULATED_PAYMENT_NOTE.to_string()),
        };

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, payment_method, payment_status, amount_cents,
                processed_at, card_last4, card_brand, card_token, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.payment_method)
        .bind(payment.payment_status)
        .bind(payment.amount_cents)
        .bind(payment.processed_at)
        .bind(&payment.card_last4)
        .bind(&payment.card_brand)
        .bind(&payment.card_token)
        .bind(&payment.note)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            // ux_payments_successful_order: someone else already paid
            DbError::UniqueViolation { .. } => invalid_state(order_id, OrderStatus::Paid).into(),
            other => other,
        })?;

        let flipped = sqlx::query(
            "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(order_id)
        .bind(OrderStatus::Paid)
        .bind(now)
        .bind(OrderStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            return Err(invalid_state(order_id, OrderStatus::Paid).into());
        }

        tx.commit().await?;
        Ok(payment)
    }

    /// The successful payment of an order, for its owner or an admin.
    pub async fn get_by_order(&self, order_id: &str, caller: &Principal) -> DbResult<Payment> {
        let mut conn = self.pool.acquire().await?;

        let order = fetch_order(&mut conn, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        caller.require_owner_or_admin(&order.user_id)?;

        let payment = fetch_successful_payment(&mut conn, order_id)
            .await?
            .ok_or_else(|| CoreError::PaymentNotFound(order_id.to_string()))?;

        Ok(payment)
    }
}

async fn fetch_successful_payment(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> DbResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ?1 AND payment_status = ?2"
    ))
    .bind(order_id)
    .bind(PaymentStatus::Successful)
    .fetch_optional(conn)
    .await?;

    Ok(payment)
}

fn invalid_state(order_id: &str, status: OrderStatus) -> CoreError {
    CoreError::InvalidOrderState {
        order_id: order_id.to_string(),
        current_status: status.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
