//! # User Repository
//!
//! Accounts as seen by the Order Engine. Registration and approval live in
//! an external workflow; this repository only stores the outcome.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shop_core::validation::validate_email;
use shop_core::{User, UserRole, UserStatus, ValidationError};

/// Fields needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub status: UserStatus,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user. Emails are stored lowercase and must be unique.
    pub async fn insert(&self, new: NewUser) -> DbResult<User> {
        let email = validate_email(&new.email)?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            full_name: new.full_name.trim().to_string(),
            role: new.role,
            status: new.status,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %user.id, role = ?user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, role, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(user.status)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => ValidationError::Duplicate {
                field: "email".to_string(),
                value: user.email.clone(),
            }
            .into(),
            other => other,
        })?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, id).await
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, role, status, created_at, updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Records the outcome of the external approval workflow.
    pub async fn set_status(&self, id: &str, status: UserStatus) -> DbResult<User> {
        let result = sqlx::query("UPDATE users SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        info!(user_id = %id, status = status.as_str(), "User status changed");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Makes sure an active admin with `email` exists, promoting an existing
    /// account if needed.
    pub async fn ensure_admin(&self, email: &str, full_name: &str) -> DbResult<User> {
        if let Some(user) = self.get_by_email(email).await? {
            if user.role == UserRole::Admin && user.is_active() {
                return Ok(user);
            }

            sqlx::query(
                "UPDATE users SET role = ?2, status = ?3, updated_at = ?4 WHERE id = ?1",
            )
            .bind(&user.id)
            .bind(UserRole::Admin)
            .bind(UserStatus::Active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

            info!(user_id = %user.id, "Promoted existing user to bootstrap admin");

            return self
                .get_by_id(&user.id)
                .await?
                .ok_or_else(|| DbError::not_found("User", user.id.clone()));
        }

        let admin = self
            .insert(NewUser {
                email: email.to_string(),
                full_name: full_name.to_string(),
                role: UserRole::Admin,
                status: UserStatus::Active,
            })
            .await?;

        info!(user_id = %admin.id, "Created bootstrap admin");
        Ok(admin)
    }
}

/// Loads a user on an existing connection or transaction.
pub(crate) async fn fetch_user(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, full_name, role, status, created_at, updated_at
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shop_core::CoreError;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            full_name: "Ana Lima".to_string(),
            role: UserRole::User,
            status: UserStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let user = users.insert(new_user("Ana@Shop.io")).await.unwrap();
        assert_eq!(user.email, "ana@shop.io");
        assert_eq!(user.status, UserStatus::Pending);

        let by_email = users.get_by_email("ANA@shop.io").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let active = users.set_status(&user.id, UserStatus::Active).await.unwrap();
        assert!(active.is_active());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().insert(new_user("ana@shop.io")).await.unwrap();

        let err = db.users().insert(new_user("ana@shop.io")).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Duplicate { ref field, ref value }))
                if field == "email" && value == "ana@shop.io"
        ));

        // Case differences still collide after normalization.
        let err = db.users().insert(new_user("ANA@shop.io")).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let plain = users.insert(new_user("ops@shop.io")).await.unwrap();
        let admin = users.ensure_admin("ops@shop.io", "Ops").await.unwrap();
        assert_eq!(admin.id, plain.id);
        assert_eq!(admin.role, UserRole::Admin);
        assert!(admin.is_active());

        let again = users.ensure_admin("ops@shop.io", "Ops").await.unwrap();
        assert_eq!(again.id, admin.id);
    }

    #[tokio::test]
    async fn test_set_status_unknown_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .users()
            .set_status("missing", UserStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
