//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veranda_core::{CustomerId, Money, OrderId, OrderLineId, OrderStatus, ProductId};

/// A completed checkout, with pricing frozen at creation time.
///
/// Everything except `status`, `payment_status` and `updated_at` is
/// immutable once the order exists; catalog price changes never move the
/// stored amounts.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Internal order ID.
    pub id: OrderId,
    /// Globally unique, human-readable order number (e.g.
    /// `VER-20260715-9F3A21BC`).
    pub order_number: String,
    /// Customer the order belongs to.
    pub customer_id: CustomerId,
    /// Sum of line prices at creation time.
    pub subtotal: Money,
    /// Tax computed at creation time.
    pub tax_amount: Money,
    /// Shipping charged at creation time.
    pub shipping_cost: Money,
    /// `subtotal + tax_amount + shipping_cost`, never recomputed.
    pub total_amount: Money,
    /// Fulfillment status; the only field that moves after creation.
    pub status: OrderStatus,
    /// Recipient name.
    pub shipping_name: String,
    /// Delivery address.
    pub shipping_address: String,
    /// Contact phone, if given.
    pub shipping_phone: Option<String>,
    /// Payment method label.
    pub payment_method: String,
    /// Payment status label (driven by the external payment surface).
    pub payment_status: String,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
    /// The order's lines, priced at creation time.
    pub lines: Vec<OrderLine>,
}

/// A product line on an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    /// Unique line ID.
    pub id: OrderLineId,
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: i64,
    /// Unit price captured at order creation, NOT the live catalog price.
    pub price: Money,
}

/// Input line for order creation: the product, how many, and the unit
/// price captured from the catalog at checkout time.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderLine {
    /// Referenced product.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: i64,
    /// Captured unit price, frozen from here on.
    pub unit_price: Money,
}

/// Shipping and payment details supplied at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingInfo {
    /// Recipient name. Required.
    pub name: String,
    /// Delivery address. Required.
    pub address: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Payment method label; defaults to `"Credit Card"` when absent.
    pub payment_method: Option<String>,
}

/// The mutations an existing order admits, enumerated explicitly.
///
/// Orders have exactly two mutable fields; anything else is rejected by
/// construction rather than silently accepted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderUpdate {
    /// Move the order to a new fulfillment status (transition-checked).
    Status(OrderStatus),
    /// Replace the payment status label.
    PaymentStatus(String),
}
