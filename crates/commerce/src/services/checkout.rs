//! Checkout coordinator.
//!
//! Converts a cart into an order as one unit of work: read the lines,
//! capture current catalog prices, price the order, write it, and clear
//! exactly what was priced. Everything happens inside a single
//! transaction, so a failure anywhere leaves neither a new order nor a
//! mutated cart behind - including when the caller abandons the future,
//! since an uncommitted transaction rolls back on drop.

use sqlx::SqlitePool;

use veranda_core::CustomerId;

use crate::db::{CartRepository, RepositoryError};
use crate::error::CommerceError;
use crate::models::order::{NewOrderLine, Order, ShippingInfo};
use crate::services::orders;
use crate::services::pricing::{self, PricedLine, PricingPolicy};

/// Service layer for the cart-to-order conversion.
pub struct CheckoutService<'a> {
    pool: &'a SqlitePool,
    policy: &'a PricingPolicy,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, policy: &'a PricingPolicy) -> Self {
        Self { pool, policy }
    }

    /// Convert the customer's cart into a `PENDING` order.
    ///
    /// Line prices are captured from the catalog once, at this moment, and
    /// frozen on the order; later catalog changes don't touch them. The
    /// clear step removes only the quantities that were actually priced,
    /// so nothing added mid-checkout is silently dropped.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::EmptyCart` if the cart has no lines.
    /// Returns `CommerceError::Validation` if the shipping info is
    /// incomplete.
    /// Returns `CommerceError::Conflict` if order-number allocation
    /// exhausted its retry.
    pub async fn checkout(
        &self,
        customer_id: CustomerId,
        shipping: &ShippingInfo,
    ) -> Result<Order, CommerceError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        // First statement is a write: takes the database's write lock up
        // front, so the read-price-write sequence below cannot interleave
        // with concurrent cart mutation.
        let Some(cart) = CartRepository::lock_for_checkout(&mut tx, customer_id).await? else {
            // No cart row yet means nothing was ever added.
            return Err(CommerceError::EmptyCart);
        };

        let items = CartRepository::list_view_in(&mut tx, cart.id).await?;
        if items.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        // Capture each line's current catalog unit price; these become the
        // frozen order-line prices.
        let lines: Vec<NewOrderLine> = items
            .iter()
            .map(|item| NewOrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        let priced: Vec<PricedLine> = lines
            .iter()
            .map(|line| PricedLine {
                unit_price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();
        let breakdown = pricing::price(&priced, self.policy)?;

        let order =
            orders::create_order_in(&mut tx, customer_id, &lines, &breakdown, shipping).await?;

        // Clear only what was priced and ordered.
        for item in &items {
            CartRepository::consume_line(&mut tx, item.line_id, item.quantity).await?;
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order = %order.order_number,
            customer = %customer_id,
            total = %order.total_amount,
            "checkout complete"
        );
        Ok(order)
    }
}
