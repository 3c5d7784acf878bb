//! Order ledger state machine behaviour.

#![allow(clippy::unwrap_used)]

use veranda_commerce::CommerceError;
use veranda_commerce::models::order::{NewOrderLine, Order, OrderUpdate};
use veranda_commerce::services::pricing::{self, PricedLine};
use veranda_core::{CustomerId, Money, OrderId, OrderStatus};
use veranda_integration_tests::TestContext;

/// Seed a product, fill the cart, and check out one order.
async fn place_order(ctx: &TestContext, customer: CustomerId) -> Order {
    let product = ctx.seed_product("Amber Noir Eau de Parfum", 8999, 100).await;
    ctx.carts().add_item(customer, product, 1).await.unwrap();
    ctx.checkout()
        .checkout(customer, &TestContext::shipping())
        .await
        .unwrap()
}

#[tokio::test]
async fn happy_path_walks_every_status() {
    let ctx = TestContext::new().await;
    let order = place_order(&ctx, CustomerId::new(1)).await;
    let orders = ctx.orders();

    for next in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let updated = orders.transition(order.id, next).await.unwrap();
        assert_eq!(updated.status, next);
    }

    let final_order = orders.get(order.id).await.unwrap();
    assert_eq!(final_order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn skipping_a_step_is_rejected() {
    let ctx = TestContext::new().await;
    let order = place_order(&ctx, CustomerId::new(1)).await;

    let err = ctx
        .orders()
        .transition(order.id, OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            CommerceError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            }
        ),
        "{err}"
    );

    // The order is untouched.
    let reread = ctx.orders().get(order.id).await.unwrap();
    assert_eq!(reread.status, OrderStatus::Pending);
}

#[tokio::test]
async fn terminal_states_reject_all_transitions() {
    let ctx = TestContext::new().await;
    let orders = ctx.orders();

    let delivered = place_order(&ctx, CustomerId::new(1)).await;
    for next in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        orders.transition(delivered.id, next).await.unwrap();
    }
    let cancelled = place_order(&ctx, CustomerId::new(2)).await;
    orders.cancel(cancelled.id).await.unwrap();

    for terminal in [delivered.id, cancelled.id] {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let err = orders.transition(terminal, next).await.unwrap_err();
            assert!(matches!(err, CommerceError::InvalidTransition { .. }), "{err}");
        }
    }
}

#[tokio::test]
async fn cancel_only_within_the_cancellation_window() {
    let ctx = TestContext::new().await;
    let orders = ctx.orders();

    // From PENDING: allowed.
    let order = place_order(&ctx, CustomerId::new(1)).await;
    let cancelled = orders.cancel(order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // From CONFIRMED: allowed.
    let order = place_order(&ctx, CustomerId::new(2)).await;
    orders.transition(order.id, OrderStatus::Confirmed).await.unwrap();
    let cancelled = orders.cancel(order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // From PROCESSING onward: rejected.
    let order = place_order(&ctx, CustomerId::new(3)).await;
    orders.transition(order.id, OrderStatus::Confirmed).await.unwrap();
    orders.transition(order.id, OrderStatus::Processing).await.unwrap();
    let err = orders.cancel(order.id).await.unwrap_err();
    assert!(
        matches!(
            err,
            CommerceError::InvalidTransition {
                from: OrderStatus::Processing,
                to: OrderStatus::Cancelled,
            }
        ),
        "{err}"
    );
}

#[tokio::test]
async fn transition_on_unknown_order_is_not_found() {
    let ctx = TestContext::new().await;
    let err = ctx
        .orders()
        .transition(OrderId::new(404), OrderStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn payment_status_update_does_not_touch_fulfillment() {
    let ctx = TestContext::new().await;
    let order = place_order(&ctx, CustomerId::new(1)).await;

    let updated = ctx
        .orders()
        .apply(order.id, OrderUpdate::PaymentStatus("paid".to_owned()))
        .await
        .unwrap();

    assert_eq!(updated.payment_status, "paid");
    assert_eq!(updated.status, OrderStatus::Pending);
    assert_eq!(updated.total_amount, order.total_amount);
}

#[tokio::test]
async fn list_for_customer_is_newest_first_and_scoped() {
    let ctx = TestContext::new().await;
    let customer = CustomerId::new(1);
    let other = CustomerId::new(2);

    let first = place_order(&ctx, customer).await;
    let second = place_order(&ctx, customer).await;
    place_order(&ctx, other).await;

    let orders = ctx.orders().list_for_customer(customer).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders.first().unwrap().id, second.id);
    assert_eq!(orders.last().unwrap().id, first.id);

    assert_eq!(ctx.orders().list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn ledger_create_writes_pending_order_with_given_prices() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Velvet Iris Eau de Parfum", 10_499, 10).await;

    let lines = [NewOrderLine {
        product_id: product,
        quantity: 2,
        unit_price: Money::from_minor(10_499),
    }];
    let priced: Vec<PricedLine> = lines
        .iter()
        .map(|l| PricedLine {
            unit_price: l.unit_price,
            quantity: l.quantity,
        })
        .collect();
    let breakdown = pricing::price(&priced, &ctx.policy).unwrap();

    let order = ctx
        .orders()
        .create(CustomerId::new(1), &lines, &breakdown, &TestContext::shipping())
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.subtotal, Money::from_minor(20_998));
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines.first().unwrap().quantity, 2);

    let reread = ctx.orders().get(order.id).await.unwrap();
    assert_eq!(reread.order_number, order.order_number);
}

#[tokio::test]
async fn ledger_create_rejects_empty_lines() {
    let ctx = TestContext::new().await;
    let breakdown = pricing::price(&[], &ctx.policy).unwrap();

    let err = ctx
        .orders()
        .create(CustomerId::new(1), &[], &breakdown, &TestContext::shipping())
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Validation(_)), "{err}");
}
