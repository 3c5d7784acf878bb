//! Veranda commerce core.
//!
//! This crate implements the cart-to-order transaction pipeline of the
//! Veranda store as a library:
//!
//! - [`services::cart`] - the mutable per-customer cart
//! - [`services::pricing`] - pure subtotal/tax/shipping computation
//! - [`services::orders`] - the immutable order ledger and its status
//!   state machine
//! - [`services::checkout`] - the atomic cart-to-order conversion
//!
//! Presentation, authentication and catalog management live outside this
//! crate; they consume these services through the types in [`models`] and
//! the opaque IDs from `veranda-core`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::CommerceError;

/// Result type alias for `CommerceError`.
pub type Result<T> = std::result::Result<T, CommerceError>;
