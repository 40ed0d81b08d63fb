//! Payment service: charge a pending order and read its payment back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use shop_core::Principal;

use crate::error::ApiResult;
use crate::views::PaymentView;
use crate::AppState;

/// Card details submitted at checkout. Only the last four digits are kept.
#[derive(Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentInput {
    pub card_number: String,
    pub card_brand: String,
}

impl std::fmt::Debug for PaymentInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentInput")
            .field("card_number", &"<redacted>")
            .field("card_brand", &self.card_brand)
            .finish()
    }
}

pub struct PaymentService {
    state: Arc<AppState>,
}

impl PaymentService {
    pub fn new(state: Arc<AppState>) -> Self {
        PaymentService { state }
    }

    /// Pays a PENDING order; owner or admin only.
    pub async fn process_payment(
        &self,
        order_id: &str,
        input: PaymentInput,
        caller: &Principal,
    ) -> ApiResult<PaymentView> {
        debug!(order_id = %order_id, brand = %input.card_brand, "process_payment");

        let payment = self
            .state
            .db
            .payments()
            .process_payment(order_id, &input.card_number, &input.card_brand, caller)
            .await?;

        Ok(PaymentView::from(&payment))
    }

    pub async fn get_payment(&self, order_id: &str, caller: &Principal) -> ApiResult<PaymentView> {
        debug!(order_id = %order_id, "get_payment");

        let payment = self.state.db.payments().get_by_order(order_id, caller).await?;
        Ok(PaymentView::from(&payment))
    }
}
