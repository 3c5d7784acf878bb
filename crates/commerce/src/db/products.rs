//! Catalog lookup repository.
//!
//! The commerce core treats the catalog as read-only: it looks up current
//! price, name and stock and never mutates them as part of cart or order
//! operations. The write methods here exist for the seeding cli and for
//! the external catalog owner.

use chrono::Utc;
use sqlx::SqlitePool;

use veranda_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::product::CatalogProduct;

/// Repository for catalog product lookups.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up an active product by ID.
    ///
    /// Inactive products are treated as absent: they can no longer be
    /// added to carts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(
        &self,
        id: ProductId,
    ) -> Result<Option<CatalogProduct>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, price, stock_quantity
            FROM products
            WHERE id = ? AND is_active = 1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CatalogProduct::from))
    }

    /// Number of products in the catalog, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a catalog product (seeding path).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        name: &str,
        description: Option<&str>,
        price: Money,
        stock_quantity: i64,
    ) -> Result<ProductId, RepositoryError> {
        let now = Utc::now();
        let (id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO products (name, description, price, stock_quantity, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, 1, ?, ?)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock_quantity)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    /// Replace a product's live price (catalog-owner path).
    ///
    /// Existing order lines are unaffected: their price was captured at
    /// order creation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_price(&self, id: ProductId, price: Money) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET price = ?, updated_at = ? WHERE id = ?")
            .bind(price)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: i64,
    stock_quantity: i64,
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            unit_price: Money::from_minor(row.price),
            stock_quantity: row.stock_quantity,
        }
    }
}
