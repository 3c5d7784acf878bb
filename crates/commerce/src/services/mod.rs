//! Business services over the persistence layer.
//!
//! Each service borrows the shared pool and is cheap to construct per
//! request. Callers identify themselves with an explicit, opaque
//! `CustomerId` on every operation; there is no ambient session state.

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod pricing;

pub use cart::CartService;
pub use checkout::CheckoutService;
pub use orders::OrderService;
