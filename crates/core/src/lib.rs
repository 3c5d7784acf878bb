//! Veranda Core - Shared types library.
//!
//! This crate provides common types used across all Veranda components:
//! - `commerce` - Cart, pricing, and order pipeline
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. This
//! keeps it lightweight and allows it to be used anywhere. The optional
//! `sqlite` feature adds sqlx bindings for the newtypes so repositories can
//! bind and decode them directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, and order status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
