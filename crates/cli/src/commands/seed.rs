//! Seed the catalog with sample products.
//!
//! Inserts a small demo catalog so the cart and checkout pipeline has
//! something to sell. Runs migrations first, and is a no-op when the
//! catalog already has products unless `--force` is passed.

use secrecy::SecretString;
use tracing::info;

use veranda_commerce::db::{self, ProductRepository};
use veranda_core::Money;

/// Demo catalog: name, description, price in minor units, stock.
const SAMPLE_PRODUCTS: &[(&str, &str, i64, i64)] = &[
    (
        "Amber Noir Eau de Parfum",
        "Warm amber and smoked vanilla, 100ml",
        8999,
        25,
    ),
    (
        "Citrus Vetiver Eau de Toilette",
        "Bright bergamot over dry vetiver, 100ml",
        7999,
        40,
    ),
    (
        "Cedar & Sage Cologne",
        "Crisp cedarwood with clary sage, 50ml",
        5499,
        32,
    ),
    (
        "Velvet Iris Eau de Parfum",
        "Powdery iris and tonka bean, 50ml",
        10_499,
        18,
    ),
    (
        "Sel Marin Body Mist",
        "Sea salt and driftwood, 200ml",
        2999,
        60,
    ),
    (
        "Discovery Set",
        "Five 10ml travel sprays of the house classics",
        4599,
        50,
    ),
];

/// Seed sample products into the catalog.
///
/// # Errors
///
/// Returns an error if the database URL is missing or a database
/// operation fails.
pub async fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("VERANDA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "VERANDA_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    db::MIGRATOR.run(&pool).await?;

    let products = ProductRepository::new(&pool);

    let existing = products.count().await?;
    if existing > 0 && !force {
        info!(existing, "Catalog already seeded; use --force to add anyway");
        return Ok(());
    }

    for (name, description, price_minor, stock) in SAMPLE_PRODUCTS {
        let id = products
            .insert(name, Some(description), Money::from_minor(*price_minor), *stock)
            .await?;
        info!(%id, name, "Seeded product");
    }

    info!(count = SAMPLE_PRODUCTS.len(), "Seeding complete!");
    Ok(())
}
