//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{no_control_chars, valid_username};

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Logout request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    /// Refresh token to invalidate.
    pub refresh_token: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "valid_username"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,
    /// Initial profile address.
    #[serde(default)]
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,
}

/// Profile update request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub status: Option<String>,
}

/// Folder create or rename request.
///
/// The name is checked by the folder manager so that a missing or blank
/// name is reported as a bad request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FolderNameRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Audit log entry request.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateLogRequest {
    #[serde(default)]
    #[validate(length(max = 2000, message = "info1 must be at most 2000 characters"))]
    pub info1: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "info2 must be at most 2000 characters"))]
    pub info2: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "info3 must be at most 2000 characters"))]
    pub info3: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "info4 must be at most 2000 characters"))]
    pub info4: Option<String>,
}

/// Query parameters for the recent-files view.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentQuery {
    /// Number of files to return (default 5, capped at 100; 0 returns none).
    pub limit: Option<u32>,
}
