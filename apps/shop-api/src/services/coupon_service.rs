//! Coupon administration.
//!
//! Discount values travel in storage units: cents for FIXED_AMOUNT, basis
//! points for PERCENTAGE (1000 = 10%).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use shop_core::{Coupon, CoreError, DiscountType, Principal};
use shop_db::CouponInput;

use crate::error::{ApiError, ApiResult};
use crate::views::CouponView;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CouponForm {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    #[serde(default)]
    pub new_user_only: bool,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_redemptions: Option<i64>,
}

impl From<CouponForm> for CouponInput {
    fn from(form: CouponForm) -> Self {
        CouponInput {
            code: form.code,
            description: form.description,
            discount_type: form.discount_type,
            discount_value: form.discount_value,
            new_user_only: form.new_user_only,
            valid_from: form.valid_from,
            valid_to: form.valid_to,
            max_redemptions: form.max_redemptions,
        }
    }
}

pub struct CouponService {
    state: Arc<AppState>,
}

impl CouponService {
    pub fn new(state: Arc<AppState>) -> Self {
        CouponService { state }
    }

    pub async fn create_coupon(&self, form: CouponForm, caller: &Principal) -> ApiResult<CouponView> {
        debug!(code = %form.code, "create_coupon");
        caller.require_admin()?;

        let coupon = self.state.db.coupons().insert(&form.into()).await?;
        Ok(CouponView::new(&coupon, 0))
    }

    pub async fn list_coupons(&self) -> ApiResult<Vec<CouponView>> {
        let coupons = self.state.db.coupons().list().await?;

        let mut views = Vec::with_capacity(coupons.len());
        for coupon in &coupons {
            views.push(self.view(coupon).await?);
        }
        Ok(views)
    }

    /// Case-insensitive lookup by code.
    pub async fn get_coupon(&self, code: &str) -> ApiResult<CouponView> {
        let coupon = self
            .state
            .db
            .coupons()
            .get_by_code(code)
            .await?
            .ok_or_else(|| ApiError::from(CoreError::CouponNotFound(code.trim().to_string())))?;

        self.view(&coupon).await
    }

    /// Refused with CONFLICT once any order has used the coupon.
    pub async fn delete_coupon(&self, id: &str, caller: &Principal) -> ApiResult<()> {
        debug!(id = %id, "delete_coupon");
        caller.require_admin()?;

        self.state.db.coupons().delete(id).await?;
        Ok(())
    }

    async fn view(&self, coupon: &Coupon) -> ApiResult<CouponView> {
        let redemptions = self.state.db.coupons().redemption_count(&coupon.id).await?;
        Ok(CouponView::new(coupon, redemptions))
    }
}
