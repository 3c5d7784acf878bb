//! End-to-end checkout behaviour.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use tokio::task::JoinSet;

use veranda_commerce::CommerceError;
use veranda_commerce::models::order::ShippingInfo;
use veranda_commerce::services::CheckoutService;
use veranda_core::{CustomerId, Money, OrderStatus};
use veranda_integration_tests::TestContext;

#[tokio::test]
async fn checkout_with_no_cart_fails_empty() {
    let ctx = TestContext::new().await;
    let err = ctx
        .checkout()
        .checkout(CustomerId::new(1), &TestContext::shipping())
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::EmptyCart), "{err}");
    assert!(ctx.orders().list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_with_cleared_cart_fails_empty() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Discovery Set", 4599, 10).await;
    let customer = CustomerId::new(1);

    ctx.carts().add_item(customer, product, 1).await.unwrap();
    ctx.carts().clear(customer).await.unwrap();

    let err = ctx
        .checkout()
        .checkout(customer, &TestContext::shipping())
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::EmptyCart), "{err}");
    assert!(ctx.orders().list_for_customer(customer).await.unwrap().is_empty());
}

#[tokio::test]
async fn successful_checkout_creates_pending_order_and_empties_cart() {
    let ctx = TestContext::new().await;
    let amber = ctx.seed_product("Amber Noir Eau de Parfum", 8999, 25).await;
    let citrus = ctx.seed_product("Citrus Vetiver Eau de Toilette", 7999, 40).await;
    let customer = CustomerId::new(1);

    ctx.carts().add_item(customer, amber, 1).await.unwrap();
    ctx.carts().add_item(customer, citrus, 2).await.unwrap();

    let order = ctx
        .checkout()
        .checkout(customer, &TestContext::shipping())
        .await
        .unwrap();

    // Worked example: subtotal 249.97, tax 20.00, free shipping, total 269.97.
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.subtotal, Money::from_minor(24_997));
    assert_eq!(order.tax_amount, Money::from_minor(2000));
    assert_eq!(order.shipping_cost, Money::ZERO);
    assert_eq!(order.total_amount, Money::from_minor(26_997));
    assert_eq!(order.customer_id, customer);
    assert_eq!(order.payment_method, "Credit Card");
    assert_eq!(order.payment_status, "pending");
    assert_eq!(order.lines.len(), 2);

    // The cart is empty; the order is the only one.
    assert!(ctx.carts().list_items(customer).await.unwrap().is_empty());
    let orders = ctx.orders().list_for_customer(customer).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders.first().unwrap().id, order.id);
}

#[tokio::test]
async fn checkout_below_threshold_charges_flat_shipping() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Cedar & Sage Cologne", 5000, 10).await;
    let customer = CustomerId::new(1);

    ctx.carts().add_item(customer, product, 1).await.unwrap();
    let order = ctx
        .checkout()
        .checkout(customer, &TestContext::shipping())
        .await
        .unwrap();

    assert_eq!(order.subtotal, Money::from_minor(5000));
    assert_eq!(order.tax_amount, Money::from_minor(400));
    assert_eq!(order.shipping_cost, Money::from_minor(999));
    assert_eq!(order.total_amount, Money::from_minor(6399));
}

#[tokio::test]
async fn order_line_prices_are_frozen_against_catalog_changes() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Velvet Iris Eau de Parfum", 10_499, 10).await;
    let customer = CustomerId::new(1);

    ctx.carts().add_item(customer, product, 1).await.unwrap();
    let order = ctx
        .checkout()
        .checkout(customer, &TestContext::shipping())
        .await
        .unwrap();

    ctx.set_catalog_price(product, 100).await;

    let reread = ctx.orders().get(order.id).await.unwrap();
    assert_eq!(reread.lines.first().unwrap().price, Money::from_minor(10_499));
    assert_eq!(reread.subtotal, order.subtotal);
    assert_eq!(reread.total_amount, order.total_amount);
}

#[tokio::test]
async fn checkout_rejects_incomplete_shipping_info() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Discovery Set", 4599, 10).await;
    let customer = CustomerId::new(1);
    ctx.carts().add_item(customer, product, 1).await.unwrap();

    let shipping = ShippingInfo {
        name: "  ".to_owned(),
        address: "12 Analytical Way, London".to_owned(),
        phone: None,
        payment_method: None,
    };
    let err = ctx.checkout().checkout(customer, &shipping).await.unwrap_err();
    assert!(matches!(err, CommerceError::Validation(_)), "{err}");

    // The failed attempt left no partial state behind.
    assert!(ctx.orders().list_for_customer(customer).await.unwrap().is_empty());
    assert_eq!(ctx.carts().list_items(customer).await.unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_records_chosen_payment_method() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Sel Marin Body Mist", 2999, 10).await;
    let customer = CustomerId::new(1);
    ctx.carts().add_item(customer, product, 1).await.unwrap();

    let shipping = ShippingInfo {
        payment_method: Some("PayPal".to_owned()),
        ..TestContext::shipping()
    };
    let order = ctx.checkout().checkout(customer, &shipping).await.unwrap();
    assert_eq!(order.payment_method, "PayPal");
}

#[tokio::test]
async fn order_numbers_look_like_ver_date_suffix() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Discovery Set", 4599, 10).await;
    let customer = CustomerId::new(1);
    ctx.carts().add_item(customer, product, 1).await.unwrap();

    let order = ctx
        .checkout()
        .checkout(customer, &TestContext::shipping())
        .await
        .unwrap();

    let mut parts = order.order_number.split('-');
    assert_eq!(parts.next(), Some("VER"));
    assert_eq!(parts.next().unwrap().len(), 8);
    assert_eq!(parts.next().unwrap().len(), 8);
    assert_eq!(parts.next(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_allocate_distinct_order_numbers() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Amber Noir Eau de Parfum", 8999, 1000).await;

    let customers: Vec<CustomerId> = (1..=8).map(CustomerId::new).collect();
    for customer in &customers {
        ctx.carts().add_item(*customer, product, 1).await.unwrap();
    }

    let mut tasks = JoinSet::new();
    for customer in customers {
        let pool = ctx.pool.clone();
        let policy = ctx.policy.clone();
        tasks.spawn(async move {
            CheckoutService::new(&pool, &policy)
                .checkout(customer, &TestContext::shipping())
                .await
        });
    }

    let mut numbers = HashSet::new();
    while let Some(result) = tasks.join_next().await {
        let order = result.unwrap().unwrap();
        numbers.insert(order.order_number);
    }
    assert_eq!(numbers.len(), 8);
}
