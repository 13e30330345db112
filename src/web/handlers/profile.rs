//! Profile handlers.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::{ProfileUpdate, ProfileView};
use crate::web::dto::{ApiResponse, UpdateProfileRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims};

use super::{read_upload_form, AppState};

/// Only the owner or a staff member may change a profile.
fn ensure_can_edit(claims: &JwtClaims, user_id: i64) -> Result<(), ApiError> {
    if claims.sub == user_id || claims.is_staff {
        Ok(())
    } else {
        Err(ApiError::forbidden("Cannot modify another user's profile"))
    }
}

/// GET /api/profiles/:user_id - Fetch a profile.
#[utoipa::path(
    get,
    path = "/profiles/{user_id}",
    tag = "profiles",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Profile", body = ProfileView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    let profile = state.profiles().fetch(user_id).await?;
    Ok(Json(ApiResponse::new(profile)))
}

/// PUT /api/profiles/:user_id - Update address and/or status.
#[utoipa::path(
    put,
    path = "/profiles/{user_id}",
    tag = "profiles",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileView),
        (status = 400, description = "Empty status"),
        (status = 403, description = "Not the profile owner"),
        (status = 404, description = "Profile not found"),
        (status = 422, description = "Validation failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    ensure_can_edit(&claims, user_id)?;

    let update = ProfileUpdate {
        address: req.address,
        status: req.status,
    };
    let profile = state.profiles().update(user_id, &update).await?;

    Ok(Json(ApiResponse::new(profile)))
}

/// PUT /api/profiles/:user_id/picture - Replace the profile picture.
///
/// Request body: multipart/form-data with a "file" field.
#[utoipa::path(
    put,
    path = "/profiles/{user_id}/picture",
    tag = "profiles",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Updated profile", body = ProfileView),
        (status = 400, description = "No file or empty file"),
        (status = 403, description = "Not the profile owner"),
        (status = 404, description = "Profile not found"),
        (status = 422, description = "Extension not allowed or file too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_profile_picture(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    ensure_can_edit(&claims, user_id)?;

    let (file_name, content, _) = read_upload_form(multipart).await?.into_file()?;
    let profile = state
        .profiles()
        .set_picture(user_id, &file_name, &content)
        .await?;

    Ok(Json(ApiResponse::new(profile)))
}
