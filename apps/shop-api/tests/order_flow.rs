//! End-to-end checkout flows through the service layer against an
//! in-memory store.

use std::sync::Arc;

use shop_api::services::coupon_service::{CouponForm, CouponService};
use shop_api::services::order_service::{OrderService, PlaceOrderInput};
use shop_api::services::payment_service::{PaymentInput, PaymentService};
use shop_api::services::product_service::{ProductForm, ProductService};
use shop_api::{AppState, ErrorCode};
use shop_core::{CartLine, DiscountType, OrderStatus, PaymentStatus, Principal, UserRole, UserStatus};
use shop_db::{Database, DbConfig, NewUser};

struct Shop {
    state: Arc<AppState>,
    admin: Principal,
    customer: Principal,
    mug_id: String,
}

impl Shop {
    fn orders(&self) -> OrderService {
        OrderService::new(self.state.clone())
    }

    fn payments(&self) -> PaymentService {
        PaymentService::new(self.state.clone())
    }

    fn products(&self) -> ProductService {
        ProductService::new(self.state.clone())
    }

    fn coupons(&self) -> CouponService {
        CouponService::new(self.state.clone())
    }

    async fn another_customer(&self, email: &str) -> Principal {
        let user = self
            .state
            .db
            .users()
            .insert(NewUser {
                email: email.to_string(),
                full_name: "Second Customer".to_string(),
                role: UserRole::User,
                status: UserStatus::Active,
            })
            .await
            .unwrap();
        Principal::user(user.id)
    }

    async fn coupon(&self, code: &str, discount_type: DiscountType, value: i64) {
        self.coupons()
            .create_coupon(
                CouponForm {
                    code: code.to_string(),
                    description: None,
                    discount_type,
                    discount_value: value,
                    new_user_only: false,
                    valid_from: None,
                    valid_to: None,
                    max_redemptions: None,
                },
                &self.admin,
            )
            .await
            .unwrap();
    }

    fn cart(&self, quantity: i64, coupon_code: Option<&str>) -> PlaceOrderInput {
        PlaceOrderInput {
            items: vec![CartLine::new(self.mug_id.clone(), quantity)],
            coupon_code: coupon_code.map(str::to_string),
            shipping_address: Some("1 Harbour St".to_string()),
            billing_address: None,
        }
    }
}

/// A store with one admin, one active customer and a $10.00 mug (stock 10).
async fn shop() -> Shop {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let admin = db.users().ensure_admin("admin@shop.local", "Admin").await.unwrap();
    let customer = db
        .users()
        .insert(NewUser {
            email: "ana@shop.io".to_string(),
            full_name: "Ana".to_string(),
            role: UserRole::User,
            status: UserStatus::Active,
        })
        .await
        .unwrap();

    let state = Arc::new(AppState::new(db));
    let admin = Principal::admin(admin.id);

    let mug = ProductService::new(state.clone())
        .create_product(
            ProductForm {
                name: "Mug".to_string(),
                description: None,
                price: 1000,
                stock: 10,
            },
            &admin,
        )
        .await
        .unwrap();

    Shop {
        state,
        admin,
        customer: Principal::user(customer.id),
        mug_id: mug.id,
    }
}

fn visa() -> PaymentInput {
    PaymentInput {
        card_number: "4000111122223333".to_string(),
        card_brand: "VISA".to_string(),
    }
}

#[tokio::test]
async fn test_order_without_coupon() {
    let shop = shop().await;

    let order = shop.orders().place_order(&shop.customer, shop.cart(2, None)).await.unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, 2000);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price, 1000);
    assert_eq!(order.items[0].total_price, 2000);
    assert_eq!(order.shipping_address.as_deref(), Some("1 Harbour St"));

    let mug = shop.products().get_product(&shop.mug_id).await.unwrap();
    assert_eq!(mug.stock, 8);
}

#[tokio::test]
async fn test_order_with_percentage_coupon() {
    let shop = shop().await;
    shop.coupon("SAVE10", DiscountType::Percentage, 1000).await;

    let order = shop
        .orders()
        .place_order(&shop.customer, shop.cart(2, Some("save10")))
        .await
        .unwrap();

    assert_eq!(order.subtotal, 2000);
    assert_eq!(order.discount, 200);
    assert_eq!(order.total_amount, 1800);
    assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));

    let coupon = shop.coupons().get_coupon("Save10").await.unwrap();
    assert_eq!(coupon.redemptions, 1);
}

#[tokio::test]
async fn test_fixed_coupon_larger_than_subtotal() {
    let shop = shop().await;
    shop.coupon("FIFTY", DiscountType::FixedAmount, 5000).await;

    let order = shop
        .orders()
        .place_order(&shop.customer, shop.cart(2, Some("FIFTY")))
        .await
        .unwrap();

    assert_eq!(order.total_amount, 0);
}

#[tokio::test]
async fn test_rejected_order_changes_nothing() {
    let shop = shop().await;

    let err = shop
        .orders()
        .place_order(&shop.customer, shop.cart(2, Some("NOPE")))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);

    let err = shop
        .orders()
        .place_order(&shop.customer, shop.cart(11, None))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);

    let mug = shop.products().get_product(&shop.mug_id).await.unwrap();
    assert_eq!(mug.stock, 10);
    assert!(shop.orders().list_my_orders(&shop.customer).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_marks_order_paid() {
    let shop = shop().await;
    let order = shop.orders().place_order(&shop.customer, shop.cart(2, None)).await.unwrap();

    let payment = shop
        .payments()
        .process_payment(&order.id, visa(), &shop.customer)
        .await
        .unwrap();

    assert_eq!(payment.card_last4, "3333");
    assert_eq!(payment.amount, 2000);
    assert_eq!(payment.payment_status, PaymentStatus::Successful);
    assert_eq!(payment.note.as_deref(), Some("Simulated payment processed successfully"));

    let order = shop.orders().get_order(&order.id, &shop.customer).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);

    let fetched = shop.payments().get_payment(&order.id, &shop.customer).await.unwrap();
    assert_eq!(fetched.id, payment.id);

    let err = shop
        .payments()
        .process_payment(&order.id, visa(), &shop.customer)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn test_invalid_card_leaves_order_pending() {
    let shop = shop().await;
    let order = shop.orders().place_order(&shop.customer, shop.cart(1, None)).await.unwrap();

    let err = shop
        .payments()
        .process_payment(
            &order.id,
            PaymentInput {
                card_number: "1234567812345678".to_string(),
                card_brand: "VISA".to_string(),
            },
            &shop.customer,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);

    let order = shop.orders().get_order(&order.id, &shop.customer).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let err = shop.payments().get_payment(&order.id, &shop.customer).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_other_customers_are_forbidden() {
    let shop = shop().await;
    let order = shop.orders().place_order(&shop.customer, shop.cart(1, None)).await.unwrap();
    let stranger = shop.another_customer("bo@shop.io").await;

    let err = shop.orders().get_order(&order.id, &stranger).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
    assert_eq!(err.http_status(), 403);

    let err = shop
        .payments()
        .process_payment(&order.id, visa(), &stranger)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = shop
        .orders()
        .list_orders_for_user(&shop.customer.user_id, &stranger)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    // admins see everything
    assert!(shop.orders().get_order(&order.id, &shop.admin).await.is_ok());
    let listed = shop
        .orders()
        .list_orders_for_user(&shop.customer.user_id, &shop.admin)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_read_back_matches_placement() {
    let shop = shop().await;
    let placed = shop.orders().place_order(&shop.customer, shop.cart(3, None)).await.unwrap();

    let fetched = shop.orders().get_order(&placed.id, &shop.customer).await.unwrap();

    assert_eq!(fetched.total_amount, placed.total_amount);
    assert_eq!(fetched.items.len(), placed.items.len());
    for (a, b) in fetched.items.iter().zip(&placed.items) {
        assert_eq!(a.product_id, b.product_id);
        assert_eq!(a.product_name, b.product_name);
        assert_eq!(a.quantity, b.quantity);
        assert_eq!(a.unit_price, b.unit_price);
        assert_eq!(a.total_price, b.total_price);
    }
}

#[tokio::test]
async fn test_admin_status_changes() {
    let shop = shop().await;
    let order = shop.orders().place_order(&shop.customer, shop.cart(1, None)).await.unwrap();

    let err = shop
        .orders()
        .update_order_status(&order.id, "SHIPPED", &shop.customer)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = shop
        .orders()
        .update_order_status(&order.id, "LOST", &shop.admin)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);

    // payment is the only way to PAID
    let err = shop
        .orders()
        .update_order_status(&order.id, "PAID", &shop.admin)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);

    shop.payments()
        .process_payment(&order.id, visa(), &shop.customer)
        .await
        .unwrap();

    let shipped = shop
        .orders()
        .update_order_status(&order.id, "shipped", &shop.admin)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let delivered = shop
        .orders()
        .update_order_status(&order.id, "DELIVERED", &shop.admin)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_catalog_administration() {
    let shop = shop().await;

    let form = ProductForm {
        name: "Kettle".to_string(),
        description: Some("Gooseneck".to_string()),
        price: 5999,
        stock: 3,
    };
    let err = shop
        .products()
        .create_product(form.clone(), &shop.customer)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let kettle = shop.products().create_product(form, &shop.admin).await.unwrap();
    assert!(kettle.sku.starts_with("PROD-"));
    assert_eq!(shop.products().list_products(None).await.unwrap().len(), 2);

    shop.products().deactivate_product(&kettle.id, &shop.admin).await.unwrap();
    assert_eq!(shop.products().list_products(None).await.unwrap().len(), 1);

    let err = shop
        .orders()
        .place_order(
            &shop.customer,
            PlaceOrderInput {
                items: vec![CartLine::new(kettle.id, 1)],
                coupon_code: None,
                shipping_address: None,
                billing_address: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);
}

#[tokio::test]
async fn test_redeemed_coupon_cannot_be_deleted() {
    let shop = shop().await;
    shop.coupon("SAVE10", DiscountType::Percentage, 1000).await;
    let coupon = shop.coupons().get_coupon("SAVE10").await.unwrap();

    shop.orders()
        .place_order(&shop.customer, shop.cart(1, Some("SAVE10")))
        .await
        .unwrap();

    let err = shop.coupons().delete_coupon(&coupon.id, &shop.admin).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(shop.coupons().list_coupons().await.unwrap().len(), 1);
}
