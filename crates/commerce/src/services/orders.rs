//! Order ledger service.
//!
//! Owns order creation and the status state machine. Once created, an
//! order's pricing never moves; the only legal write paths are the
//! explicitly enumerated [`OrderUpdate`] commands.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use veranda_core::{CustomerId, OrderId, OrderStatus};

use crate::db::{OrderRepository, RepositoryError};
use crate::error::CommerceError;
use crate::models::order::{NewOrderLine, Order, OrderUpdate, ShippingInfo};
use crate::services::pricing::PriceBreakdown;

/// Payment method recorded when the shopper doesn't pick one.
const DEFAULT_PAYMENT_METHOD: &str = "Credit Card";

/// Service layer for order operations.
pub struct OrderService<'a> {
    pool: &'a SqlitePool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Create a `PENDING` order with the given captured line prices.
    ///
    /// Allocates a globally unique order number; a collision is retried
    /// once with a fresh number before surfacing as `Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Validation` if there are no lines or the
    /// shipping info is incomplete.
    /// Returns `CommerceError::Conflict` if order-number allocation
    /// exhausted its retry.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        lines: &[NewOrderLine],
        pricing: &PriceBreakdown,
        shipping: &ShippingInfo,
    ) -> Result<Order, CommerceError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let order = create_order_in(&mut *tx, customer_id, lines, pricing, shipping).await?;
        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(order)
    }

    /// Get an order by ID with its lines loaded.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the order doesn't exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, CommerceError> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("order {id}")))
    }

    /// All orders for a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the database operation fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, CommerceError> {
        Ok(self.orders.list_for_customer(customer_id).await?)
    }

    /// All orders in the ledger, newest first (admin surface).
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the database operation fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, CommerceError> {
        Ok(self.orders.list_all().await?)
    }

    /// Apply one of the enumerated order mutations.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the order doesn't exist.
    /// Returns `CommerceError::InvalidTransition` for an illegal status
    /// change.
    pub async fn apply(&self, id: OrderId, update: OrderUpdate) -> Result<Order, CommerceError> {
        match update {
            OrderUpdate::Status(next) => self.transition(id, next).await,
            OrderUpdate::PaymentStatus(label) => {
                self.orders
                    .set_payment_status(id, &label)
                    .await
                    .map_err(|e| match e {
                        RepositoryError::NotFound => {
                            CommerceError::NotFound(format!("order {id}"))
                        }
                        other => other.into(),
                    })?;
                self.get(id).await
            }
        }
    }

    /// Move the order to `next`.
    ///
    /// The update only applies when the current status is a legal
    /// predecessor of `next`; skipping steps or leaving a terminal status
    /// is rejected.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the order doesn't exist.
    /// Returns `CommerceError::InvalidTransition` otherwise when the guard
    /// doesn't match.
    pub async fn transition(&self, id: OrderId, next: OrderStatus) -> Result<Order, CommerceError> {
        if let Some(order) = self.orders.transition_status(id, next).await? {
            tracing::info!(order = %order.order_number, status = %next, "order status updated");
            return Ok(order);
        }

        // The guard didn't match: either the order is unknown (surfaces as
        // NotFound here) or its current status does not allow the move.
        let current = self.get(id).await?;
        Err(CommerceError::InvalidTransition {
            from: current.status,
            to: next,
        })
    }

    /// Cancel the order. Sugar for a transition to `Cancelled`, so it
    /// succeeds only from `Pending` or `Confirmed`.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the order doesn't exist.
    /// Returns `CommerceError::InvalidTransition` if the order is past the
    /// cancellation window.
    pub async fn cancel(&self, id: OrderId) -> Result<Order, CommerceError> {
        self.transition(id, OrderStatus::Cancelled).await
    }
}

/// Create an order inside the caller's transaction (checkout shares this
/// path with [`OrderService::create`]).
pub(crate) async fn create_order_in(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
    lines: &[NewOrderLine],
    pricing: &PriceBreakdown,
    shipping: &ShippingInfo,
) -> Result<Order, CommerceError> {
    if lines.is_empty() {
        return Err(CommerceError::Validation(
            "an order needs at least one line".to_owned(),
        ));
    }
    if shipping.name.trim().is_empty() {
        return Err(CommerceError::Validation(
            "shipping name is required".to_owned(),
        ));
    }
    if shipping.address.trim().is_empty() {
        return Err(CommerceError::Validation(
            "shipping address is required".to_owned(),
        ));
    }

    let payment_method = shipping
        .payment_method
        .as_deref()
        .unwrap_or(DEFAULT_PAYMENT_METHOD);

    let mut order_number = generate_order_number(Utc::now());
    for attempt in 0..2 {
        let inserted = OrderRepository::insert_in(
            conn,
            &order_number,
            customer_id,
            lines,
            pricing,
            shipping,
            payment_method,
        )
        .await;

        match inserted {
            Ok(order) => {
                tracing::info!(
                    order = %order.order_number,
                    customer = %customer_id,
                    total = %order.total_amount,
                    "order created"
                );
                return Ok(order);
            }
            Err(RepositoryError::Conflict(_)) if attempt == 0 => {
                tracing::warn!(number = %order_number, "order number collision, regenerating");
                order_number = generate_order_number(Utc::now());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(CommerceError::Conflict(
        "could not allocate a unique order number".to_owned(),
    ))
}

/// Generate an order number: a date stamp plus the first 8 hex digits of a
/// v4 UUID, e.g. `VER-20260715-9F3A21BC`.
///
/// Collision-free in practice under concurrent creation; the insert path
/// still treats a unique violation as retryable rather than fatal.
pub(crate) fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("VER-{}-{}", now.format("%Y%m%d"), suffix)
}
