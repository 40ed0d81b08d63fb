//! # Storefront API bootstrap
//!
//! Prepares the store for service:
//! ```text
//! load config ─► init tracing ─► open database (migrations)
//!            ─► ensure admin ─► report health ─► close
//! ```

use anyhow::Context;
use tracing::{info, warn};

use shop_api::{init_tracing, Database, ShopConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ShopConfig::load().context("loading configuration")?;
    init_tracing(&config.log_level);

    info!(database = %config.database_path, "Starting storefront bootstrap");

    let db = Database::new(config.to_db_config())
        .await
        .context("opening database")?;

    let (total, applied) = db.migration_status().await?;
    info!(applied, total, "Database migrations complete");

    let admin = db
        .users()
        .ensure_admin(&config.admin_email, &config.admin_name)
        .await
        .context("creating bootstrap admin")?;
    info!(admin_id = %admin.id, email = %admin.email, "Bootstrap admin ready");

    if db.health_check().await {
        let products = db.products().count().await?;
        info!(products, "Store is ready");
    } else {
        warn!("Database health check failed");
    }

    db.close().await;
    Ok(())
}
