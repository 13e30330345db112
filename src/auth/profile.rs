//! User profiles.
//!
//! Every user has exactly one profile, created at registration and removed
//! with the user by the row cascade.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::auth::validation::{validate_address, ValidationError};
use crate::db::{Database, DbPool};
use crate::file::{BlobStore, FileService, UploadClass, DEFAULT_MAX_FILE_SIZE};
use crate::{Result, VaultError};

/// Status given to new profiles.
pub const DEFAULT_PROFILE_STATUS: &str = "Pending";

/// Maximum status length.
pub const MAX_STATUS_LENGTH: usize = 50;

/// Profile-related errors.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("status must not be empty")]
    StatusEmpty,

    #[error("status must be at most {MAX_STATUS_LENGTH} characters")]
    StatusTooLong,
}

impl From<ProfileError> for VaultError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::StatusEmpty => VaultError::InvalidInput(err.to_string()),
            _ => VaultError::Validation(err.to_string()),
        }
    }
}

/// A profile row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub address: Option<String>,
    pub status: String,
    /// Blob key of the profile picture.
    pub profile_picture: Option<String>,
    pub created_at: String,
}

/// A profile joined with its user's public identity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct ProfileView {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub address: Option<String>,
    pub status: String,
    pub profile_picture: Option<String>,
}

/// Profile fields to change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub address: Option<String>,
    pub status: Option<String>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.status.is_none()
    }

    /// Check field bounds. Status is trimmed before checking.
    pub fn validate(&self) -> std::result::Result<(), ProfileError> {
        if let Some(address) = &self.address {
            validate_address(address)?;
        }
        if let Some(status) = &self.status {
            let status = status.trim();
            if status.is_empty() {
                return Err(ProfileError::StatusEmpty);
            }
            if status.chars().count() > MAX_STATUS_LENGTH {
                return Err(ProfileError::StatusTooLong);
            }
        }
        Ok(())
    }
}

/// Repository for profile rows.
pub struct ProfileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create the profile of a user.
    pub async fn create(&self, user_id: i64, address: Option<&str>) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, address, status)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, address, status, profile_picture, created_at
            "#,
        )
        .bind(user_id)
        .bind(address)
        .bind(DEFAULT_PROFILE_STATUS)
        .fetch_one(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(profile)
    }

    /// Get the profile row of a user.
    pub async fn get_by_user(&self, user_id: i64) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, address, status, profile_picture, created_at
             FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(profile)
    }

    /// Get the profile of a user joined with username and email.
    pub async fn get_view(&self, user_id: i64) -> Result<Option<ProfileView>> {
        let view = sqlx::query_as::<_, ProfileView>(
            "SELECT p.user_id, u.username, u.email, p.address, p.status, p.profile_picture
             FROM profiles p JOIN users u ON u.id = p.user_id
             WHERE p.user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(view)
    }

    /// Apply a partial update. Returns false if the user has no profile.
    pub async fn update(&self, user_id: i64, update: &ProfileUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(self.get_by_user(user_id).await?.is_some());
        }

        let mut query: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("UPDATE profiles SET ");
        let mut separated = query.separated(", ");

        if let Some(address) = &update.address {
            separated.push("address = ");
            separated.push_bind_unseparated(address.clone());
        }
        if let Some(status) = &update.status {
            separated.push("status = ");
            separated.push_bind_unseparated(status.trim().to_string());
        }

        query.push(" WHERE user_id = ");
        query.push_bind(user_id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the picture reference. Returns false if the user has no profile.
    pub async fn set_picture(&self, user_id: i64, key: Option<&str>) -> Result<bool> {
        let result = sqlx::query("UPDATE profiles SET profile_picture = ? WHERE user_id = ?")
            .bind(key)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Profile operations exposed to the transport layer.
pub struct ProfileService<'a> {
    db: &'a Database,
    store: &'a dyn BlobStore,
    max_file_size: u64,
}

impl<'a> ProfileService<'a> {
    pub fn new(db: &'a Database, store: &'a dyn BlobStore) -> Self {
        Self {
            db,
            store,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Fetch the profile of a user.
    pub async fn fetch(&self, user_id: i64) -> Result<ProfileView> {
        ProfileRepository::new(self.db.pool())
            .get_view(user_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("profile".to_string()))
    }

    /// Update address and/or status.
    pub async fn update(&self, user_id: i64, update: &ProfileUpdate) -> Result<ProfileView> {
        update.validate()?;

        if !ProfileRepository::new(self.db.pool())
            .update(user_id, update)
            .await?
        {
            return Err(VaultError::NotFound("profile".to_string()));
        }

        info!(user_id, "Profile updated");
        self.fetch(user_id).await
    }

    /// Replace the profile picture.
    ///
    /// The previous picture blob is removed on a best-effort basis.
    pub async fn set_picture(
        &self,
        user_id: i64,
        file_name: &str,
        content: &[u8],
    ) -> Result<ProfileView> {
        if content.is_empty() {
            return Err(VaultError::InvalidInput("file content is empty".to_string()));
        }
        if content.len() as u64 > self.max_file_size {
            return Err(VaultError::Validation(
                "profile picture is too large".to_string(),
            ));
        }
        UploadClass::ProfilePicture.validate(file_name)?;

        let repo = ProfileRepository::new(self.db.pool());
        let previous = repo
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("profile".to_string()))?;

        let key = self.store.store(content, file_name)?;
        if let Err(e) = repo.set_picture(user_id, Some(&key)).await {
            let _ = self.store.delete(&key);
            return Err(e);
        }

        if let Some(old_key) = previous.profile_picture.as_deref() {
            FileService::new(self.db, self.store)
                .discard_blob(old_key)
                .await;
        }

        info!(user_id, "Profile picture updated");
        self.fetch(user_id).await
    }
}
