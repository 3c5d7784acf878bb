//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use veranda_core::{CartId, CartLineId, CustomerId, Money, ProductId};

use crate::services::pricing::PriceBreakdown;

/// A customer's cart. Created lazily on first access, never deleted;
/// emptied on checkout or explicit clear.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning customer. One cart per customer, enforced by the store.
    pub customer_id: CustomerId,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// When the cart was last touched.
    pub updated_at: DateTime<Utc>,
}

/// A single product line in a cart.
///
/// Carries no price: cart lines are always priced against the live catalog,
/// unlike order lines which freeze their price.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Unique line ID.
    pub id: CartLineId,
    /// Cart this line belongs to.
    pub cart_id: CartId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Units of the product. Always positive; driving it to zero deletes
    /// the line.
    pub quantity: i64,
    /// When the line was first added.
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with live catalog data for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    /// Line being displayed.
    pub line_id: CartLineId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Current catalog display name.
    pub name: String,
    /// Current catalog unit price (not frozen).
    pub unit_price: Money,
    /// Units in the cart.
    pub quantity: i64,
    /// Units available according to the catalog.
    pub stock_quantity: i64,
    /// `unit_price * quantity` at current catalog prices.
    pub line_subtotal: Money,
}

/// Cart totals for display (badge counts, mini-cart).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartSummary {
    /// Total units across all lines.
    pub item_count: i64,
    /// Priced totals at current catalog prices.
    pub pricing: PriceBreakdown,
}
