//! # Product Repository (Catalog Store)
//!
//! Database operations for products.
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Compare-and-decrement in one statement                     │
//! │                                                                         │
//! │  UPDATE products                                                       │
//! │     SET stock = stock - :qty                                           │
//! │   WHERE id = :id AND is_active = 1 AND stock >= :qty                   │
//! │                                                                         │
//! │  rows_affected = 1  → reserved                                         │
//! │  rows_affected = 0  → re-read the row to report why:                   │
//! │                       missing / inactive / insufficient stock          │
//! │                                                                         │
//! │  Two orders racing for the last unit: SQLite serializes the writes,    │
//! │  the second UPDATE sees stock = 0 and matches nothing.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shop_core::validation::{validate_price_cents, validate_product_name, validate_stock};
use shop_core::{CoreError, Product};

const PRODUCT_COLUMNS: &str =
    "id, sku, name, description, price_cents, stock, is_active, created_at, updated_at";

/// Fields an administrator supplies for a new or edited product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}

impl ProductInput {
    fn validate(&self) -> DbResult<()> {
        validate_product_name(&self.name)?;
        validate_price_cents(self.price_cents)?;
        validate_stock(self.stock)?;
        Ok(())
    }

    fn description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Whether the product exists and is active.
    pub async fn is_active(&self, id: &str) -> DbResult<bool> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(active.unwrap_or(false))
    }

    /// Takes `quantity` units out of stock on its own.
    ///
    /// Order placement does not call this; it decrements inside its own
    /// transaction.
    pub async fn decrement_stock(&self, id: &str, quantity: i64) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;
        decrement_stock_on(&mut conn, id, quantity, Utc::now()).await
    }

    /// Lists active products by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts all products, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Creates an active product with a generated SKU (`PROD-XXXXXXXX`).
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        input.validate()?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        let product = Product {
            id: id.to_string(),
            sku: generate_sku(&id),
            name: input.name.trim().to_string(),
            description: input.description(),
            price_cents: input.price_cents,
            stock: input.stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description, price_cents, stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    /// Replaces a product's editable fields.
    ///
    /// Existing order items keep their snapshot price and name.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        input.validate()?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock = ?5,
                updated_at = ?6
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.description())
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        info!(id = %product.id, "Product updated");
        Ok(product)
    }

    /// Soft-deletes a product. Idempotent.
    pub async fn deactivate(&self, id: &str) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        info!(id = %product.id, "Product deactivated");
        Ok(product)
    }
}

/// Loads a product on an existing connection or transaction.
pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

/// Atomically takes `quantity` units from an active product's stock.
///
/// Returns the product as it is after the decrement. When nothing matched,
/// the row is re-read to report `ProductNotFound`, `ProductInactive` or
/// `InsufficientStock`.
pub(crate) async fn decrement_stock_on(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<Product> {
    if quantity <= 0 {
        return Err(shop_core::ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    let updated = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND is_active = 1 AND stock >= ?2
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(quantity)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(product) = updated {
        debug!(product_id = %id, quantity, remaining = product.stock, "Stock decremented");
        return Ok(product);
    }

    let current = fetch_product(conn, id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

    let err = if !current.is_active {
        CoreError::ProductInactive { name: current.name }
    } else {
        CoreError::InsufficientStock {
            sku: current.sku,
            available: current.stock,
            requested: quantity,
        }
    };

    Err(DbError::Domain(err))
}

/// `PROD-` followed by the first 8 hex digits of the id, uppercased.
fn generate_sku(id: &Uuid) -> String {
    let hex = id.simple().to_string();
    format!("PROD-{}", hex[..8].to_uppercase())
}
