//! Domain types for the commerce pipeline.
//!
//! These types represent validated domain objects separate from database
//! row types; repositories construct them when reading rows back.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartLine, CartLineView, CartSummary};
pub use order::{NewOrderLine, Order, OrderLine, OrderUpdate, ShippingInfo};
pub use product::CatalogProduct;
