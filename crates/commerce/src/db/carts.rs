//! Cart repository for database operations.
//!
//! Quantity changes are single-statement upserts so that concurrent
//! modifications of the same line are both applied; there is no
//! read-modify-write window anywhere in this module.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use veranda_core::{CartId, CartLineId, CustomerId, Money, ProductId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartLine, CartLineView};

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the customer's cart, creating it on first access.
    ///
    /// Race-safe: a unique violation on the insert means a concurrent
    /// request created the cart first, so we re-read theirs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, customer_id: CustomerId) -> Result<Cart, RepositoryError> {
        if let Some(cart) = self.get(customer_id).await? {
            return Ok(cart);
        }

        let now = Utc::now();
        let inserted = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO carts (customer_id, created_at, updated_at)
            VALUES (?, ?, ?)
            RETURNING id, customer_id, created_at, updated_at
            ",
        )
        .bind(customer_id)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(row.into()),
            Err(e) => {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    // Lost the race; the winner's cart is the cart.
                    return self
                        .get(customer_id)
                        .await?
                        .ok_or(RepositoryError::NotFound);
                }
                Err(RepositoryError::Database(e))
            }
        }
    }

    /// Get the customer's cart, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, customer_id: CustomerId) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(
            r"
            SELECT id, customer_id, created_at, updated_at
            FROM carts
            WHERE customer_id = ?
            ",
        )
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Add `quantity` to the (cart, product) line, inserting it if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_increment(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine, RepositoryError> {
        let row: CartLineRow = sqlx::query_as(
            r"
            INSERT INTO cart_items (cart_id, product_id, quantity, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = quantity + excluded.quantity
            RETURNING id, cart_id, product_id, quantity, created_at
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Set the (cart, product) line to exactly `quantity`, inserting it if
    /// absent. The caller guarantees `quantity > 0`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_exact(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine, RepositoryError> {
        let row: CartLineRow = sqlx::query_as(
            r"
            INSERT INTO cart_items (cart_id, product_id, quantity, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = excluded.quantity
            RETURNING id, cart_id, product_id, quantity, created_at
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete the (cart, product) line.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND product_id = ?")
            .bind(cart_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every line in the cart. The cart row itself stays.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Cart lines joined with live catalog name/price/stock for display.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_view(&self, cart_id: CartId) -> Result<Vec<CartLineView>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::list_view_in(&mut conn, cart_id).await
    }

    // =========================================================================
    // Checkout-transaction operations
    // =========================================================================

    /// Take write intent on the customer's cart row inside a checkout
    /// transaction, bumping `updated_at`.
    ///
    /// Being the transaction's first write, this serializes the whole
    /// checkout against concurrent mutation of the same database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub(crate) async fn lock_for_checkout(
        conn: &mut SqliteConnection,
        customer_id: CustomerId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(
            r"
            UPDATE carts SET updated_at = ?
            WHERE customer_id = ?
            RETURNING id, customer_id, created_at, updated_at
            ",
        )
        .bind(Utc::now())
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// `list_view` against an explicit connection (checkout reads inside
    /// its transaction).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub(crate) async fn list_view_in(
        conn: &mut SqliteConnection,
        cart_id: CartId,
    ) -> Result<Vec<CartLineView>, RepositoryError> {
        let rows: Vec<CartLineViewRow> = sqlx::query_as(
            r"
            SELECT ci.id, ci.product_id, ci.quantity, p.name, p.price, p.stock_quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = ?
            ORDER BY ci.created_at ASC, ci.id ASC
            ",
        )
        .bind(cart_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Remove exactly the priced quantity from a line at the end of
    /// checkout.
    ///
    /// Deletes the row when the quantity is unchanged since pricing;
    /// otherwise subtracts the priced amount, leaving whatever was added
    /// in between in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub(crate) async fn consume_line(
        conn: &mut SqliteConnection,
        line_id: CartLineId,
        priced_quantity: i64,
    ) -> Result<(), RepositoryError> {
        let deleted = sqlx::query("DELETE FROM cart_items WHERE id = ? AND quantity = ?")
            .bind(line_id)
            .bind(priced_quantity)
            .execute(&mut *conn)
            .await?;

        if deleted.rows_affected() > 0 {
            return Ok(());
        }

        sqlx::query("UPDATE cart_items SET quantity = quantity - ? WHERE id = ? AND quantity > ?")
            .bind(priced_quantity)
            .bind(line_id)
            .bind(priced_quantity)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct CartRow {
    id: i64,
    customer_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i64,
    cart_id: i64,
    product_id: i64,
    quantity: i64,
    created_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartLineId::new(row.id),
            cart_id: CartId::new(row.cart_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartLineViewRow {
    id: i64,
    product_id: i64,
    quantity: i64,
    name: String,
    price: i64,
    stock_quantity: i64,
}

impl From<CartLineViewRow> for CartLineView {
    fn from(row: CartLineViewRow) -> Self {
        let unit_price = Money::from_minor(row.price);
        Self {
            line_id: CartLineId::new(row.id),
            product_id: ProductId::new(row.product_id),
            name: row.name,
            unit_price,
            quantity: row.quantity,
            stock_quantity: row.stock_quantity,
            line_subtotal: unit_price * row.quantity,
        }
    }
}
