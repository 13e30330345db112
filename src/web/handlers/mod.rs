//! API handlers for the Web API.

pub mod auth;
pub mod file;
pub mod folder;
pub mod log;
pub mod profile;
pub mod user;

pub use auth::*;
pub use file::*;
pub use folder::*;
pub use log::*;
pub use profile::*;
pub use user::*;

use std::sync::Arc;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::auth::ProfileService;
use crate::db::{Database, NewRefreshToken, RefreshTokenRepository, User};
use crate::file::{BlobStore, FileService, FolderService, DEFAULT_MAX_FILE_SIZE};
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    /// Blob store holding file contents and profile pictures.
    pub storage: Arc<dyn BlobStore>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    /// Refresh token expiry in days.
    pub refresh_token_expiry: u64,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Arc<Database>,
        storage: Arc<dyn BlobStore>,
        jwt_secret: &str,
        access_expiry: u64,
        refresh_expiry: u64,
    ) -> Self {
        Self {
            db,
            storage,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// File lifecycle manager bound to this state.
    pub fn files(&self) -> FileService<'_> {
        FileService::new(&self.db, self.storage.as_ref()).with_max_file_size(self.max_upload_size)
    }

    pub fn folders(&self) -> FolderService<'_> {
        FolderService::new(&self.db, self.storage.as_ref())
    }

    pub fn profiles(&self) -> ProfileService<'_> {
        ProfileService::new(&self.db, self.storage.as_ref())
            .with_max_file_size(self.max_upload_size)
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Generate a refresh token.
    pub fn generate_refresh_token(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Generate a refresh token for `user_id` and persist it.
    pub async fn issue_refresh_token(&self, user_id: i64) -> Result<String, ApiError> {
        let token = self.generate_refresh_token();
        let expires_at =
            chrono::Utc::now() + chrono::Duration::days(self.refresh_token_expiry as i64);

        RefreshTokenRepository::new(self.db.pool())
            .create(&NewRefreshToken {
                user_id,
                token: token.clone(),
                expires_at: expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to store refresh token: {}", e);
                ApiError::internal("Failed to create session")
            })?;

        Ok(token)
    }
}

/// Fields of an upload form.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    /// Client-side name of the `file` part.
    pub file_name: Option<String>,
    pub content: Option<Vec<u8>>,
    /// Optional `file_name` text part.
    pub declared_name: Option<String>,
}

impl UploadForm {
    /// The uploaded part's name and content, or 400 if no file was sent.
    pub fn into_file(self) -> Result<(String, Vec<u8>, Option<String>), ApiError> {
        let content = self
            .content
            .ok_or_else(|| ApiError::bad_request("No file provided"))?;
        let file_name = self
            .file_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Uploaded file has no name"))?;
        Ok((file_name, content, self.declared_name))
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    tracing::debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Request body too large")
    } else {
        ApiError::bad_request("Invalid multipart data")
    }
}

/// Read a multipart upload with a `file` part and an optional `file_name` part.
pub(crate) async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(|s| s.to_string());
                form.content = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            "file_name" => {
                form.declared_name = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}
