//! Integration test support for Veranda.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p veranda-integration-tests
//! ```
//!
//! Every test gets its own temporary `SQLite` database with the full
//! schema applied, so tests are hermetic and run in parallel.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use secrecy::SecretString;
use sqlx::SqlitePool;
use tempfile::NamedTempFile;

use veranda_commerce::db::{self, ProductRepository};
use veranda_commerce::models::order::ShippingInfo;
use veranda_commerce::services::pricing::PricingPolicy;
use veranda_commerce::services::{CartService, CheckoutService, OrderService};
use veranda_core::{Money, ProductId};

/// A migrated store backed by a temporary database file.
pub struct TestContext {
    /// Connection pool for the test database.
    pub pool: SqlitePool,
    /// Store pricing policy (the defaults: 8% tax, $9.99 flat shipping,
    /// free over $75.00).
    pub policy: PricingPolicy,
    // Keeps the database file alive for the lifetime of the context.
    _db_file: NamedTempFile,
}

impl TestContext {
    /// Create a fresh store: temp database, migrations applied.
    pub async fn new() -> Self {
        let db_file = NamedTempFile::new().expect("create temp database file");
        let url = format!("sqlite://{}", db_file.path().display());
        let pool = db::create_pool(&SecretString::from(url))
            .await
            .expect("connect to temp database");
        db::MIGRATOR.run(&pool).await.expect("run migrations");

        Self {
            pool,
            policy: PricingPolicy::default(),
            _db_file: db_file,
        }
    }

    /// Insert a catalog product, returning its ID.
    pub async fn seed_product(&self, name: &str, price_minor: i64, stock: i64) -> ProductId {
        ProductRepository::new(&self.pool)
            .insert(name, None, Money::from_minor(price_minor), stock)
            .await
            .expect("insert product")
    }

    /// Change a product's live catalog price.
    pub async fn set_catalog_price(&self, id: ProductId, price_minor: i64) {
        ProductRepository::new(&self.pool)
            .set_price(id, Money::from_minor(price_minor))
            .await
            .expect("update product price");
    }

    /// Cart service over the test pool.
    #[must_use]
    pub const fn carts(&self) -> CartService<'_> {
        CartService::new(&self.pool)
    }

    /// Order service over the test pool.
    #[must_use]
    pub const fn orders(&self) -> OrderService<'_> {
        OrderService::new(&self.pool)
    }

    /// Checkout service over the test pool and default policy.
    #[must_use]
    pub const fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(&self.pool, &self.policy)
    }

    /// A complete shipping fixture.
    #[must_use]
    pub fn shipping() -> ShippingInfo {
        ShippingInfo {
            name: "Ada Lovelace".to_owned(),
            address: "12 Analytical Way, London".to_owned(),
            phone: Some("+44 20 7946 0000".to_owned()),
            payment_method: None,
        }
    }
}
