//! # Coupon Repository (Coupon Store)
//!
//! Coupon definitions and their redemption records.
//!
//! ## Redemption Guard
//! ```text
//! INSERT INTO coupon_redemptions (...)
//! SELECT ... FROM coupons c
//!  WHERE c.id = :coupon
//!    AND (c.max_redemptions IS NULL
//!         OR (SELECT COUNT(*) ... WHERE coupon_id = c.id) < c.max_redemptions)
//! ```
//! The count and the insert are one statement inside the order transaction,
//! so a coupon limited to N can never end up with N + 1 redemptions.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shop_core::coupon::normalize_code;
use shop_core::validation::{
    validate_coupon_code, validate_coupon_window, validate_discount, validate_max_redemptions,
};
use shop_core::{Coupon, CouponRedemption, CouponRejection, CoreError, DiscountType, ValidationError};

const COUPON_COLUMNS: &str = "id, code, description, discount_type, discount_value, new_user_only, \
     valid_from, valid_to, max_redemptions, created_at";

/// Fields an administrator supplies for a new coupon.
#[derive(Debug, Clone)]
pub struct CouponInput {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Cents for `FixedAmount`, basis points for `Percentage`.
    pub discount_value: i64,
    pub new_user_only: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub max_redemptions: Option<i64>,
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Creates a coupon. The code is stored uppercase and must be unique.
    pub async fn insert(&self, input: &CouponInput) -> DbResult<Coupon> {
        let code = validate_coupon_code(&input.code)?;
        validate_discount(input.discount_type, input.discount_value)?;
        validate_coupon_window(input.valid_from, input.valid_to)?;
        validate_max_redemptions(input.max_redemptions)?;

        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            code,
            description: input
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            new_user_only: input.new_user_only,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            max_redemptions: input.max_redemptions,
            created_at: Utc::now(),
        };

        debug!(id = %coupon.id, code = %coupon.code, "Inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, discount_type, discount_value, new_user_only,
                valid_from, valid_to, max_redemptions, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.new_user_only)
        .bind(coupon.valid_from)
        .bind(coupon.valid_to)
        .bind(coupon.max_redemptions)
        .bind(coupon.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => ValidationError::Duplicate {
                field: "coupon code".to_string(),
                value: coupon.code.clone(),
            }
            .into(),
            other => other,
        })?;

        info!(id = %coupon.id, code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    /// Looks a coupon up by code, case-insensitively.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_code(&mut conn, code).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// All coupons, newest first.
    pub async fn list(&self) -> DbResult<Vec<Coupon>> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC, code"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    /// Number of redemptions recorded for one coupon.
    pub async fn redemption_count(&self, coupon_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        count_redemptions(&mut conn, coupon_id).await
    }

    /// Deletes a coupon nobody has redeemed yet.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let code: Option<String> = sqlx::query_scalar("SELECT code FROM coupons WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let code = code.ok_or_else(|| CoreError::CouponNotFound(id.to_string()))?;

        if count_redemptions(&mut tx, id).await? > 0 {
            return Err(CoreError::CouponInUse { code }.into());
        }

        sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, code = %code, "Coupon deleted");
        Ok(())
    }
}

/// Loads a coupon by (normalized) code on an existing connection.
pub(crate) async fn fetch_by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> DbResult<Option<Coupon>> {
    let coupon = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1"
    ))
    .bind(normalize_code(code))
    .fetch_optional(conn)
    .await?;

    Ok(coupon)
}

/// Redemptions of `coupon_id` only.
pub(crate) async fn count_redemptions(conn: &mut SqliteConnection, coupon_id: &str) -> DbResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = ?1")
            .bind(coupon_id)
            .fetch_one(conn)
            .await?;

    Ok(count)
}

/// Records that `coupon` was spent on `order_id`, unless its limit is
/// already used up.
pub(crate) async fn record_redemption(
    conn: &mut SqliteConnection,
    coupon: &Coupon,
    user_id: &str,
    order_id: &str,
    now: DateTime<Utc>,
) -> DbResult<CouponRedemption> {
    let redemption = CouponRedemption {
        id: Uuid::new_v4().to_string(),
        coupon_id: coupon.id.clone(),
        user_id: user_id.to_string(),
        order_id: order_id.to_string(),
        redeemed_at: now,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO coupon_redemptions (id, coupon_id, user_id, order_id, redeemed_at)
        SELECT ?1, c.id, ?3, ?4, ?5
        FROM coupons c
        WHERE c.id = ?2
          AND (c.max_redemptions IS NULL
               OR (SELECT COUNT(*) FROM coupon_redemptions r WHERE r.coupon_id = c.id)
                  < c.max_redemptions)
        "#,
    )
    .bind(&redemption.id)
    .bind(&redemption.coupon_id)
    .bind(&redemption.user_id)
    .bind(&redemption.order_id)
    .bind(redemption.redeemed_at)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CouponRejection::RedemptionLimitReached.into());
    }

    debug!(coupon = %coupon.code, order_id = %order_id, "Coupon redeemed");
    Ok(redemption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    fn percent_off(code: &str, bps: i64) -> CouponInput {
        CouponInput {
            code: code.to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: bps,
            new_user_only: false,
            valid_from: None,
            valid_to: None,
            max_redemptions: None,
        }
    }

    #[tokio::test]
    async fn test_insert_normalizes_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let coupon = db.coupons().insert(&percent_off(" save10 ", 1000)).await.unwrap();
        assert_eq!(coupon.code, "SAVE10");

        let found = db.coupons().get_by_code("Save10").await.unwrap().unwrap();
        assert_eq!(found.id, coupon.id);
        assert_eq!(found.discount_type, DiscountType::Percentage);
        assert_eq!(found.discount_value, 1000);

        assert!(db.coupons().get_by_id(&coupon.id).await.unwrap().is_some());
        assert_eq!(db.coupons().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.coupons().insert(&percent_off("SAVE10", 1000)).await.unwrap();

        let err = db.coupons().insert(&percent_off("save10", 500)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_invalid_coupon_definitions() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.coupons();

        assert!(repo.insert(&percent_off("HALFPLUS", 10_001)).await.is_err());
        assert!(repo.insert(&percent_off("ZERO", 0)).await.is_err());

        let mut backwards = percent_off("BACKWARDS", 1000);
        backwards.valid_from = Some(Utc::now());
        backwards.valid_to = Some(Utc::now() - Duration::days(1));
        assert!(repo.insert(&backwards).await.is_err());

        let mut no_uses = percent_off("NOUSES", 1000);
        no_uses.max_redemptions = Some(0);
        assert!(repo.insert(&no_uses).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_unused_coupon() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let coupon = db.coupons().insert(&percent_off("GONE", 1000)).await.unwrap();

        db.coupons().delete(&coupon.id).await.unwrap();
        assert!(db.coupons().get_by_id(&coupon.id).await.unwrap().is_none());

        let err = db.coupons().delete(&coupon.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CouponNotFound(_))));
    }
}
