//! Refresh token repository for JWT authentication.

use super::DbPool;
use crate::{Result, VaultError};

/// A persisted refresh token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    /// Token ID.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Opaque token string.
    pub token: String,
    /// Expiration timestamp (SQLite UTC format).
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Revocation timestamp (None while active).
    pub revoked_at: Option<String>,
}

/// New refresh token for creation.
pub struct NewRefreshToken {
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
}

/// Repository for refresh token operations.
pub struct RefreshTokenRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RefreshTokenRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a new refresh token.
    pub async fn create(&self, new_token: &NewRefreshToken) -> Result<RefreshToken> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(new_token.user_id)
        .bind(&new_token.token)
        .bind(&new_token.expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("refresh token".into()))
    }

    /// Get a refresh token by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, created_at, revoked_at
             FROM refresh_tokens WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(token)
    }

    /// Get a token that is neither expired nor revoked.
    pub async fn get_valid_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, created_at, revoked_at
             FROM refresh_tokens
             WHERE token = ?
               AND revoked_at IS NULL
               AND expires_at > datetime('now')",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Revoke a token. Returns false if it was unknown or already revoked.
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = datetime('now')
             WHERE token = ? AND revoked_at IS NULL",
        )
        .bind(token)
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired and revoked tokens.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE expires_at < datetime('now') OR revoked_at IS NOT NULL",
        )
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("tokenuser", "hash"))
            .await
            .unwrap();
        (db, user.id)
    }

    fn token(user_id: i64, value: &str, expires_at: &str) -> NewRefreshToken {
        NewRefreshToken {
            user_id,
            token: value.to_string(),
            expires_at: expires_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_validate() {
        let (db, user_id) = setup_db().await;
        let repo = RefreshTokenRepository::new(db.pool());

        let created = repo
            .create(&token(user_id, "abc", "2099-12-31 23:59:59"))
            .await
            .unwrap();
        assert_eq!(created.user_id, user_id);
        assert!(created.revoked_at.is_none());

        let valid = repo.get_valid_token("abc").await.unwrap();
        assert_eq!(valid.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        let (db, user_id) = setup_db().await;
        let repo = RefreshTokenRepository::new(db.pool());
        repo.create(&token(user_id, "old", "2000-01-01 00:00:00"))
            .await
            .unwrap();

        assert!(repo.get_valid_token("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke() {
        let (db, user_id) = setup_db().await;
        let repo = RefreshTokenRepository::new(db.pool());
        repo.create(&token(user_id, "abc", "2099-12-31 23:59:59"))
            .await
            .unwrap();

        assert!(repo.revoke("abc").await.unwrap());
        assert!(!repo.revoke("abc").await.unwrap());
        assert!(repo.get_valid_token("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let (db, user_id) = setup_db().await;
        let repo = RefreshTokenRepository::new(db.pool());
        repo.create(&token(user_id, "old", "2000-01-01 00:00:00"))
            .await
            .unwrap();
        repo.create(&token(user_id, "revoked", "2099-12-31 23:59:59"))
            .await
            .unwrap();
        repo.create(&token(user_id, "live", "2099-12-31 23:59:59"))
            .await
            .unwrap();
        repo.revoke("revoked").await.unwrap();

        assert_eq!(repo.cleanup_expired().await.unwrap(), 2);
        assert!(repo.get_valid_token("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_tokens_removed_with_user() {
        let (db, user_id) = setup_db().await;
        let repo = RefreshTokenRepository::new(db.pool());
        let created = repo
            .create(&token(user_id, "abc", "2099-12-31 23:59:59"))
            .await
            .unwrap();

        UserRepository::new(db.pool()).delete(user_id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
