//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! veranda migrate
//! ```
//!
//! # Environment Variables
//!
//! - `VERANDA_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`)

use secrecy::SecretString;
use tracing::info;

use veranda_commerce::db;

/// Run the commerce schema migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("VERANDA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "VERANDA_DATABASE_URL not set")?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
