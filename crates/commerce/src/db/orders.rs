//! Order ledger repository.
//!
//! Orders and their lines are written once, inside the caller's
//! transaction. Afterwards the only writes this module allows are the
//! guarded status update and the payment-status label; every other column
//! is frozen.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use veranda_core::{CustomerId, Money, OrderId, OrderLineId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::order::{NewOrderLine, Order, OrderLine, ShippingInfo};
use crate::services::pricing::PriceBreakdown;

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `order_number` already
    /// exists, so the caller can retry with a freshly generated number.
    /// Returns `RepositoryError::Database` for other database errors.
    pub(crate) async fn insert_in(
        conn: &mut SqliteConnection,
        order_number: &str,
        customer_id: CustomerId,
        lines: &[NewOrderLine],
        pricing: &PriceBreakdown,
        shipping: &ShippingInfo,
        payment_method: &str,
    ) -> Result<Order, RepositoryError> {
        let now = Utc::now();
        let row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO orders (order_number, customer_id, subtotal, tax_amount,
                                shipping_cost, total_amount, status, shipping_name,
                                shipping_address, shipping_phone, payment_method,
                                payment_status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, order_number, customer_id, subtotal, tax_amount,
                      shipping_cost, total_amount, status, shipping_name,
                      shipping_address, shipping_phone, payment_method,
                      payment_status, created_at, updated_at
            ",
        )
        .bind(order_number)
        .bind(customer_id)
        .bind(pricing.subtotal)
        .bind(pricing.tax)
        .bind(pricing.shipping)
        .bind(pricing.total)
        .bind(OrderStatus::Pending.as_str())
        .bind(&shipping.name)
        .bind(&shipping.address)
        .bind(shipping.phone.as_deref())
        .bind(payment_method)
        .bind("pending")
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order number already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let order_id = OrderId::new(row.id);
        let mut order_lines = Vec::with_capacity(lines.len());
        for line in lines {
            let line_row: OrderLineRow = sqlx::query_as(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES (?, ?, ?, ?)
                RETURNING id, order_id, product_id, quantity, price
                ",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .fetch_one(&mut *conn)
            .await?;

            order_lines.push(OrderLine::from(line_row));
        }

        row.into_order(order_lines)
    }

    /// Get an order by ID with its lines loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored status is
    /// invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "{ORDER_SELECT} WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let lines = self.lines_for(OrderId::new(r.id)).await?;
                Ok(Some(r.into_order(lines)?))
            }
            None => Ok(None),
        }
    }

    /// All orders for a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is
    /// invalid.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "{ORDER_SELECT} WHERE customer_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// All orders in the ledger, newest first (admin surface).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is
    /// invalid.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "{ORDER_SELECT} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// Guarded status update: applies only when the current status is a
    /// legal predecessor of `next`, in a single atomic statement.
    ///
    /// # Returns
    ///
    /// The updated order, or `None` when nothing matched (unknown order or
    /// illegal transition; the caller distinguishes with a follow-up read).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn transition_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let predecessors = OrderStatus::legal_predecessors(next);
        if predecessors.is_empty() {
            return Ok(None);
        }

        let placeholders = vec!["?"; predecessors.len()].join(", ");
        let sql = format!(
            "UPDATE orders SET status = ?, updated_at = ?
             WHERE id = ? AND status IN ({placeholders})
             RETURNING id, order_number, customer_id, subtotal, tax_amount,
                       shipping_cost, total_amount, status, shipping_name,
                       shipping_address, shipping_phone, payment_method,
                       payment_status, created_at, updated_at"
        );

        let mut query = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(next.as_str())
            .bind(Utc::now())
            .bind(id);
        for predecessor in predecessors {
            query = query.bind(predecessor.as_str());
        }

        let row = query.fetch_optional(self.pool).await?;
        match row {
            Some(r) => {
                let lines = self.lines_for(OrderId::new(r.id)).await?;
                Ok(Some(r.into_order(lines)?))
            }
            None => Ok(None),
        }
    }

    /// Replace the payment status label.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_payment_status(
        &self,
        id: OrderId,
        payment_status: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE orders SET payment_status = ?, updated_at = ? WHERE id = ?")
                .bind(payment_status)
                .bind(Utc::now())
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn lines_for(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows: Vec<OrderLineRow> = sqlx::query_as(
            r"
            SELECT id, order_id, product_id, quantity, price
            FROM order_items
            WHERE order_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.lines_for(OrderId::new(row.id)).await?;
            orders.push(row.into_order(lines)?);
        }
        Ok(orders)
    }
}

const ORDER_SELECT: &str = "SELECT id, order_number, customer_id, subtotal, tax_amount,
       shipping_cost, total_amount, status, shipping_name, shipping_address,
       shipping_phone, payment_method, payment_status, created_at, updated_at
FROM orders";

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_id: i64,
    subtotal: i64,
    tax_amount: i64,
    shipping_cost: i64,
    total_amount: i64,
    status: String,
    shipping_name: String,
    shipping_address: String,
    shipping_phone: Option<String>,
    payment_method: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    /// Build the domain order, parsing the stored status.
    fn into_order(self, lines: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let status = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            customer_id: CustomerId::new(self.customer_id),
            subtotal: Money::from_minor(self.subtotal),
            tax_amount: Money::from_minor(self.tax_amount),
            shipping_cost: Money::from_minor(self.shipping_cost),
            total_amount: Money::from_minor(self.total_amount),
            status,
            shipping_name: self.shipping_name,
            shipping_address: self.shipping_address,
            shipping_phone: self.shipping_phone,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            lines,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price: i64,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: OrderLineId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            price: Money::from_minor(row.price),
        }
    }
}
