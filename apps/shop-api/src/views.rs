//! # Views
//!
//! What clients receive. Plain values built from domain records; money is
//! always integer cents.
//!
//! ```json
//! {
//!   "id": "3f0c...",
//!   "status": "PENDING",
//!   "subtotal": 2000,
//!   "discount": 200,
//!   "totalAmount": 1800,
//!   "couponCode": "SAVE10",
//!   "items": [{ "productId": "...", "productName": "Mug", "quantity": 2,
//!               "unitPrice": 1000, "totalPrice": 2000 }]
//! }
//! ```
//!
//! Card tokens never leave the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use shop_core::{
    Coupon, DiscountType, Order, OrderItem, OrderStatus, Payment, PaymentMethod, PaymentStatus,
    Product,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItemView {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub total_price: i64,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        OrderItemView {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price_cents,
            total_price: item.total_price_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderView {
    pub id: String,
    pub status: OrderStatus,
    pub subtotal: i64,
    pub discount: i64,
    pub total_amount: i64,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub coupon_code: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        OrderView {
            id: order.id.clone(),
            status: order.status,
            subtotal: order.subtotal_cents,
            discount: order.discount_cents,
            total_amount: order.total_amount_cents,
            shipping_address: order.shipping_address.clone(),
            billing_address: order.billing_address.clone(),
            coupon_code: order.coupon_code.clone(),
            created_at: order.created_at,
            items: order.items.iter().map(OrderItemView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentView {
    pub id: String,
    pub order_id: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub amount: i64,
    #[ts(as = "String")]
    pub processed_at: DateTime<Utc>,
    pub card_last4: String,
    pub card_brand: String,
    pub note: Option<String>,
}

impl From<&Payment> for PaymentView {
    fn from(payment: &Payment) -> Self {
        PaymentView {
            id: payment.id.clone(),
            order_id: payment.order_id.clone(),
            payment_method: payment.payment_method,
            payment_status: payment.payment_status,
            amount: payment.amount_cents,
            processed_at: payment.processed_at,
            card_last4: payment.card_last4.clone(),
            card_brand: payment.card_brand.clone(),
            note: payment.note.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductView {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i64,
    pub is_active: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        ProductView {
            id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price_cents,
            stock: product.stock,
            is_active: product.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CouponView {
    pub id: String,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Cents for FIXED_AMOUNT, basis points for PERCENTAGE.
    pub discount_value: i64,
    pub new_user_only: bool,
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub valid_to: Option<DateTime<Utc>>,
    pub max_redemptions: Option<i64>,
    /// Orders that have used this coupon so far.
    pub redemptions: i64,
}

impl CouponView {
    pub fn new(coupon: &Coupon, redemptions: i64) -> Self {
        CouponView {
            id: coupon.id.clone(),
            code: coupon.code.clone(),
            description: coupon.description.clone(),
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            new_user_only: coupon.new_user_only,
            valid_from: coupon.valid_from,
            valid_to: coupon.valid_to,
            max_redemptions: coupon.max_redemptions,
            redemptions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::payment::SIMULATED_PAYMENT_NOTE;

    #[test]
    fn test_payment_view_has_no_token() {
        let payment = Payment {
            id: "p-1".to_string(),
            order_id: "o-1".to_string(),
            payment_method: PaymentMethod::Card,
            payment_status: PaymentStatus::Successful,
            amount_cents: 1800,
            processed_at: Utc::now(),
            card_last4: "3333".to_string(),
            card_brand: "VISA".to_string(),
            card_token: "tok_secret".to_string(),
            note: Some(SIMULATED_PAYMENT_NOTE.to_string()),
        };

        let json = serde_json::to_value(PaymentView::from(&payment)).unwrap();
        assert_eq!(json["cardLast4"], "3333");
        assert_eq!(json["amount"], 1800);
        assert_eq!(json["paymentStatus"], "SUCCESSFUL");
        assert!(!json.to_string().contains("tok_secret"));
    }
}
