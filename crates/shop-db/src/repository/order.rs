//! # Order Repository (Order Engine)
//!
//! Places orders and reads them back.
//!
//! ## Order Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  place_order: ONE transaction                           │
//! │                                                                         │
//! │  0. validate cart shape + addresses           (before BEGIN)           │
//! │  1. user exists and is ACTIVE                                          │
//! │  2. resolve every product                     ProductNotFound          │
//! │  3. price lines, check active + stock         ProductInactive,         │
//! │                                               InsufficientStock        │
//! │  4. decrement stock (compare-and-decrement)   InsufficientStock        │
//! │  5. coupon: resolve + evaluate                InvalidCoupon,           │
//! │                                               CouponRejected           │
//! │  6. total = max(0, subtotal - discount)                                │
//! │  7. INSERT order + items                                               │
//! │  8. INSERT redemption (guarded by limit)      RedemptionLimitReached   │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error → transaction dropped → ROLLBACK. Nothing is half-written.  │
//! │  The whole thing runs under DbConfig::transaction_timeout.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::coupon::{count_redemptions, fetch_by_code, record_redemption};
use super::product::{decrement_stock_on, fetch_product};
use super::user::fetch_user;
use crate::error::{DbError, DbResult};
use crate::pool::bounded;
use shop_core::coupon::{evaluate, normalize_code, RedemptionContext};
use shop_core::pricing::{price_cart, validate_cart};
use shop_core::validation::validate_address;
use shop_core::{CartLine, CoreError, Order, OrderItem, OrderStatus};

const ORDER_SELECT: &str = r#"
    SELECT
        o.id, o.user_id, o.status,
        o.subtotal_cents, o.discount_cents, o.total_amount_cents,
        o.coupon_id, c.code AS coupon_code,
        o.shipping_address, o.billing_address,
        o.created_at, o.updated_at
    FROM orders o
    LEFT JOIN coupons c ON c.id = o.coupon_id
"#;

/// Everything needed to place an order for an already-authenticated user.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub lines: Vec<CartLine>,
    pub coupon_code: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    transaction_timeout: Duration,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool, transaction_timeout: Duration) -> Self {
        OrderRepository {
            pool,
            transaction_timeout,
        }
    }

    /// Places an order atomically and returns it with its items.
    pub async fn place_order(&self, request: PlaceOrderRequest) -> DbResult<Order> {
        validate_cart(&request.lines)?;
        let shipping = validate_address("shipping address", request.shipping_address.as_deref())?;
        let billing = validate_address("billing address", request.billing_address.as_deref())?;
        let coupon_code = request
            .coupon_code
            .as_deref()
            .map(normalize_code)
            .filter(|code| !code.is_empty());

        debug!(
            user_id = %request.user_id,
            lines = request.lines.len(),
            coupon = ?coupon_code,
            "Placing order"
        );

        let result = bounded(
            "place_order",
            self.transaction_timeout,
            self.place_order_tx(&request, coupon_code.as_deref(), shipping, billing),
        )
        .await;

        match &result {
            Ok(order) => info!(
                order_id = %order.id,
                user_id = %order.user_id,
                items = order.items.len(),
                total = %order.total_amount(),
                coupon = ?order.coupon_code,
                "Order placed"
            ),
            Err(DbError::Domain(err)) => {
                warn!(user_id = %request.user_id, error = %err, "Order rejected")
            }
            Err(_) => {}
        }

        result
    }

    async fn place_order_tx(
        &self,
        request: &PlaceOrderRequest,
        coupon_code: Option<&str>,
        shipping_address: Option<String>,
        billing_address: Option<String>,
    ) -> DbResult<Order> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        let now = Utc::now();

        // 1. Customer
        let user = fetch_user(&mut tx, &request.user_id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(request.user_id.clone()))?;
        if !user.is_active() {
            return Err(CoreError::UserNotActive {
                user_id: user.id,
                status: user.status.as_str().to_string(),
            }
            .into());
        }

        // 2. Products, in cart order
        let mut resolved = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            let product = fetch_product(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            resolved.push((product, line.quantity));
        }

        // 3. Snapshot prices
        let priced = price_cart(&resolved)?;

        // 4. Reserve stock
        for line in &priced.lines {
            decrement_stock_on(&mut tx, &line.product_id, line.quantity, now).await?;
        }

        // 5-6. Coupon and total
        let applied = match coupon_code {
            Some(code) => {
                let coupon = fetch_by_code(&mut tx, code)
                    .await?
                    .ok_or_else(|| CoreError::InvalidCoupon(code.to_string()))?;
                let ctx = RedemptionContext {
                    prior_orders: count_orders_on(&mut tx, &user.id).await?,
                    redemptions: count_redemptions(&mut tx, &coupon.id).await?,
                };
                let discount = evaluate(&coupon, ctx, priced.subtotal, now)?;
                Some((coupon, discount))
            }
            None => None,
        };
        let discount = applied.as_ref().map(|(_, discount)| *discount);
        let total = priced.total_with(discount);

        // 7. Order and items
        let order_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, status, subtotal_cents, discount_cents, total_amount_cents,
                coupon_id, shipping_address, billing_address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&order_id)
        .bind(&user.id)
        .bind(OrderStatus::Pending)
        .bind(priced.subtotal.cents())
        .bind(discount.unwrap_or_default().cents())
        .bind(total.cents())
        .bind(applied.as_ref().map(|(coupon, _)| coupon.id.clone()))
        .bind(&shipping_address)
        .bind(&billing_address)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(priced.lines.len());
        for (line_no, line) in priced.lines.iter().enumerate() {
            let item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                line_no: line_no as i64,
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
                total_price_cents: line.total_price.cents(),
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, line_no, product_id, product_name,
                    quantity, unit_price_cents, total_price_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(item.line_no)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.total_price_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        // 8. Spend the coupon
        if let Some((coupon, _)) = &applied {
            record_redemption(&mut tx, coupon, &user.id, &order_id, now).await?;
        }

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            user_id: user.id,
            status: OrderStatus::Pending,
            subtotal_cents: priced.subtotal.cents(),
            discount_cents: discount.map(|d| d.cents()).unwrap_or(0),
            total_amount_cents: total.cents(),
            coupon_id: applied.as_ref().map(|(coupon, _)| coupon.id.clone()),
            coupon_code: applied.map(|(coupon, _)| coupon.code),
            shipping_address,
            billing_address,
            created_at: now,
            updated_at: now,
            items,
        })
    }

    /// Loads an order with its items, in cart order.
    pub async fn get_with_items(&self, order_id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;

        let Some(mut order) = fetch_order(&mut conn, order_id).await? else {
            return Ok(None);
        };
        order.items = fetch_items(&mut conn, order_id).await?;

        Ok(Some(order))
    }

    /// Orders of one user, newest first, each with its items.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;

        let mut orders = sqlx::query_as::<_, Order>(&format!(
            "{ORDER_SELECT} WHERE o.user_id = ?1 ORDER BY o.created_at DESC, o.rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        for order in &mut orders {
            order.items = fetch_items(&mut conn, &order.id).await?;
        }

        Ok(orders)
    }

    /// Number of orders a user has placed, any status.
    pub async fn count_for_user(&self, user_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        count_orders_on(&mut conn, user_id).await
    }

    /// Administrative status change along the order state machine.
    ///
    /// `PENDING → PAID` is not reachable here; only payment does that.
    pub async fn update_status(&self, order_id: &str, next: OrderStatus) -> DbResult<Order> {
        bounded("update_order_status", self.transaction_timeout, async {
            let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

            let current: Option<OrderStatus> =
                sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                    .bind(order_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let current = current.ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

            current.check_transition(next)?;

            let result = sqlx::query(
                "UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
            )
            .bind(order_id)
            .bind(current)
            .bind(next)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CoreError::InvalidStatusTransition {
                    from: current.to_string(),
                    to: next.to_string(),
                }
                .into());
            }

            tx.commit().await?;

            info!(order_id = %order_id, from = %current, to = %next, "Order status changed");
            Ok::<(), DbError>(())
        })
        .await?;

        self.get_with_items(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
    }
}

/// Loads an order header (no items) on an existing connection.
pub(crate) async fn fetch_order(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE o.id = ?1"))
        .bind(order_id)
        .fetch_optional(conn)
        .await?;

    Ok(order)
}

async fn fetch_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT
            id, order_id, line_no, product_id, product_name,
            quantity, unit_price_cents, total_price_cents, created_at
        FROM order_items
        WHERE order_id = ?1
        ORDER BY line_no
        "#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;

    Ok(items)
}

async fn count_orders_on(conn: &mut SqliteConnection, user_id: &str) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(conn)
        .await?;

    Ok(count)
}

// =============================================================================
// Unit Tests
// =============================================================================
