//! Catalog service. Reads are open; writes need the admin role.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use shop_core::{CoreError, Principal};
use shop_db::ProductInput;

use crate::error::{ApiError, ApiResult};
use crate::views::ProductView;
use crate::AppState;

const DEFAULT_LIST_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 500;

/// Product fields for create and update. Price in cents.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    pub stock: i64,
}

impl From<ProductForm> for ProductInput {
    fn from(form: ProductForm) -> Self {
        ProductInput {
            name: form.name,
            description: form.description,
            price_cents: form.price,
            stock: form.stock,
        }
    }
}

pub struct ProductService {
    state: Arc<AppState>,
}

impl ProductService {
    pub fn new(state: Arc<AppState>) -> Self {
        ProductService { state }
    }

    pub async fn create_product(&self, form: ProductForm, caller: &Principal) -> ApiResult<ProductView> {
        debug!(name = %form.name, "create_product");
        caller.require_admin()?;

        let product = self.state.db.products().insert(&form.into()).await?;
        Ok(ProductView::from(&product))
    }

    pub async fn update_product(
        &self,
        id: &str,
        form: ProductForm,
        caller: &Principal,
    ) -> ApiResult<ProductView> {
        debug!(id = %id, "update_product");
        caller.require_admin()?;

        let product = self.state.db.products().update(id, &form.into()).await?;
        Ok(ProductView::from(&product))
    }

    /// Soft delete. Past order items keep their snapshot.
    pub async fn deactivate_product(&self, id: &str, caller: &Principal) -> ApiResult<ProductView> {
        debug!(id = %id, "deactivate_product");
        caller.require_admin()?;

        let product = self.state.db.products().deactivate(id).await?;
        Ok(ProductView::from(&product))
    }

    pub async fn get_product(&self, id: &str) -> ApiResult<ProductView> {
        let product = self
            .state
            .db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::from(CoreError::ProductNotFound(id.to_string())))?;

        Ok(ProductView::from(&product))
    }

    /// Active products by name.
    pub async fn list_products(&self, limit: Option<u32>) -> ApiResult<Vec<ProductView>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let products = self.state.db.products().list_active(limit).await?;
        Ok(products.iter().map(ProductView::from).collect())
    }
}
