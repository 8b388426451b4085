use sqlx::PgPool;

use super::manager::{is_unique_violation, DatabaseError};
use super::models::{NewUser, User};

/// Credential store
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up by already-normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Insert and return the new id. A concurrent registration of the same
    /// email surfaces as `DuplicateEmail`.
    pub async fn insert(&self, user: &NewUser) -> Result<i64, DatabaseError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (email, password_hash, name) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DatabaseError::DuplicateEmail
            } else {
                DatabaseError::Sqlx(e)
            }
        })
    }

    /// The only mutable column on a user
    pub async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
