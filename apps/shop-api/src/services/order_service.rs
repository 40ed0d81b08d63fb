//! Order service: placement, reads and status administration.
//!
//! ## Who May Do What
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────┐
//! │ place_order          │ any caller, for themselves               │
//! │ get_order            │ owner or admin                           │
//! │ list_my_orders       │ any caller                               │
//! │ list_orders_for_user │ admin                                    │
//! │ update_order_status  │ admin                                    │
//! └──────────────────────┴──────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use shop_core::{CartLine, CoreError, OrderStatus, Principal};
use shop_db::PlaceOrderRequest;

use crate::error::{ApiError, ApiResult};
use crate::views::OrderView;
use crate::AppState;

/// Checkout request body. The buyer is the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PlaceOrderInput {
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub billing_address: Option<String>,
}

pub struct OrderService {
    state: Arc<AppState>,
}

impl OrderService {
    pub fn new(state: Arc<AppState>) -> Self {
        OrderService { state }
    }

    /// Places an order for the caller.
    pub async fn place_order(
        &self,
        caller: &Principal,
        input: PlaceOrderInput,
    ) -> ApiResult<OrderView> {
        debug!(user_id = %caller.user_id, lines = input.items.len(), "place_order");

        let order = self
            .state
            .db
            .orders()
            .place_order(PlaceOrderRequest {
                user_id: caller.user_id.clone(),
                lines: input.items,
                coupon_code: input.coupon_code,
                shipping_address: input.shipping_address,
                billing_address: input.billing_address,
            })
            .await?;

        Ok(OrderView::from(&order))
    }

    pub async fn get_order(&self, order_id: &str, caller: &Principal) -> ApiResult<OrderView> {
        debug!(order_id = %order_id, "get_order");

        let order = self
            .state
            .db
            .orders()
            .get_with_items(order_id)
            .await?
            .ok_or_else(|| ApiError::from(CoreError::OrderNotFound(order_id.to_string())))?;

        caller.require_owner_or_admin(&order.user_id)?;
        Ok(OrderView::from(&order))
    }

    /// The caller's orders, newest first.
    pub async fn list_my_orders(&self, caller: &Principal) -> ApiResult<Vec<OrderView>> {
        self.list_for(&caller.user_id).await
    }

    pub async fn list_orders_for_user(
        &self,
        user_id: &str,
        caller: &Principal,
    ) -> ApiResult<Vec<OrderView>> {
        caller.require_admin()?;
        self.list_for(user_id).await
    }

    async fn list_for(&self, user_id: &str) -> ApiResult<Vec<OrderView>> {
        let orders = self.state.db.orders().list_for_user(user_id).await?;
        Ok(orders.iter().map(OrderView::from).collect())
    }

    /// Moves an order along the fulfilment state machine.
    ///
    /// `new_status` is parsed case-insensitively; PENDING to PAID only
    /// happens through a payment.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        new_status: &str,
        caller: &Principal,
    ) -> ApiResult<OrderView> {
        debug!(order_id = %order_id, status = %new_status, caller = %caller.user_id, "update_order_status");
        caller.require_admin()?;

        let next: OrderStatus = new_status
            .parse()
            .map_err(|_| ApiError::bad_request(format!("Unknown order status: {}", new_status.trim())))?;

        let order = self.state.db.orders().update_status(order_id, next).await?;
        Ok(OrderView::from(&order))
    }
}
