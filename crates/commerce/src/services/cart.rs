//! Cart service.
//!
//! The mutable, per-customer, pre-purchase side of the pipeline. Lines
//! carry no price; every read joins the live catalog, so displayed prices
//! track catalog changes right up until checkout freezes them.

use sqlx::SqlitePool;

use veranda_core::{CustomerId, ProductId};

use crate::db::{CartRepository, ProductRepository};
use crate::error::CommerceError;
use crate::models::cart::{Cart, CartLine, CartLineView, CartSummary};
use crate::services::pricing::{self, PricedLine, PricingPolicy};

/// Service layer for shopping cart operations.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Get the customer's cart, creating it on first access.
    ///
    /// Idempotent, and safe under concurrent first access.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the database operation fails.
    pub async fn get_or_create_cart(&self, customer_id: CustomerId) -> Result<Cart, CommerceError> {
        Ok(self.carts.get_or_create(customer_id).await?)
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// Repeated adds for the same product increment the existing line
    /// rather than duplicating it.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Validation` if `quantity` is not positive.
    /// Returns `CommerceError::NotFound` if the product doesn't exist or
    /// is inactive.
    pub async fn add_item(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::Validation(format!(
                "quantity must be positive (got {quantity})"
            )));
        }

        let product = self
            .products
            .get_active(product_id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("product {product_id}")))?;

        let cart = self.carts.get_or_create(customer_id).await?;
        let line = self
            .carts
            .upsert_increment(cart.id, product.id, quantity)
            .await?;

        tracing::debug!(
            customer = %customer_id,
            product = %product_id,
            quantity = line.quantity,
            "cart line updated"
        );
        Ok(line)
    }

    /// Set a line to an exact quantity.
    ///
    /// A quantity of zero or less deletes the line; deleting an absent
    /// line is a no-op success. A positive quantity upserts the line to
    /// that value.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if a positive quantity references
    /// a product that doesn't exist or is inactive.
    pub async fn set_quantity(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Option<CartLine>, CommerceError> {
        let cart = self.carts.get_or_create(customer_id).await?;

        if quantity <= 0 {
            self.carts.delete_line(cart.id, product_id).await?;
            return Ok(None);
        }

        // The upsert may insert, so the product must still be purchasable.
        self.products
            .get_active(product_id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("product {product_id}")))?;

        let line = self
            .carts
            .upsert_exact(cart.id, product_id, quantity)
            .await?;
        Ok(Some(line))
    }

    /// Remove a product's line from the cart. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the database operation fails.
    pub async fn remove_item(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<(), CommerceError> {
        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts.delete_line(cart.id, product_id).await?;
        Ok(())
    }

    /// Remove every line from the cart. The cart row stays for reuse.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the database operation fails.
    pub async fn clear(&self, customer_id: CustomerId) -> Result<(), CommerceError> {
        let cart = self.carts.get_or_create(customer_id).await?;
        let removed = self.carts.clear(cart.id).await?;
        tracing::debug!(customer = %customer_id, removed, "cart cleared");
        Ok(())
    }

    /// The cart's lines joined with live catalog price/name/stock.
    ///
    /// This reflects *current* catalog state, distinct from the frozen
    /// prices stored once an order is created.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the database operation fails.
    pub async fn list_items(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CartLineView>, CommerceError> {
        let cart = self.carts.get_or_create(customer_id).await?;
        Ok(self.carts.list_view(cart.id).await?)
    }

    /// Item count and priced totals for display, at current catalog prices.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the database operation fails.
    pub async fn summary(
        &self,
        customer_id: CustomerId,
        policy: &PricingPolicy,
    ) -> Result<CartSummary, CommerceError> {
        let items = self.list_items(customer_id).await?;
        let item_count = items.iter().map(|item| item.quantity).sum();
        let lines: Vec<PricedLine> = items
            .iter()
            .map(|item| PricedLine {
                unit_price: item.unit_price,
                quantity: item.quantity,
            })
            .collect();

        let pricing = pricing::price(&lines, policy)?;
        Ok(CartSummary {
            item_count,
            pricing,
        })
    }
}
