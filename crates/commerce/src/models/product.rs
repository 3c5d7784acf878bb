//! Catalog product view.

use veranda_core::{Money, ProductId};

/// The slice of catalog data the commerce core consumes: current price,
/// display name and available stock. Catalog management owns everything
/// else about a product.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    /// Catalog ID of the product.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price. Orders freeze their own copy at creation time.
    pub unit_price: Money,
    /// Units available according to the catalog.
    pub stock_quantity: i64,
}
