//! User administration handlers (staff only).

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::delete_account;
use crate::db::UserRepository;
use crate::web::dto::{ApiResponse, UserDeleteResponse, UserInfo};
use crate::web::error::ApiError;
use crate::web::middleware::StaffUser;

use super::AppState;

/// GET /api/users/non-staff - Users without the staff flag.
#[utoipa::path(
    get,
    path = "/users/non-staff",
    tag = "users",
    responses(
        (status = 200, description = "Non-staff users", body = Vec<UserInfo>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_non_staff_users(
    State(state): State<Arc<AppState>>,
    StaffUser(_claims): StaffUser,
) -> Result<Json<ApiResponse<Vec<UserInfo>>>, ApiError> {
    let users = UserRepository::new(state.db.pool()).list_non_staff().await?;
    Ok(Json(ApiResponse::new(
        users.iter().map(UserInfo::from).collect(),
    )))
}

/// DELETE /api/users/:id - Delete a user with their folders, files and picture.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = UserDeleteResponse),
        (status = 400, description = "Cannot delete own account"),
        (status = 403, description = "Staff access required"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    StaffUser(claims): StaffUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserDeleteResponse>>, ApiError> {
    if claims.sub == user_id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    let outcome = delete_account(&state.db, state.storage.as_ref(), user_id).await?;
    tracing::info!(user_id, staff_id = claims.sub, "User deleted via API");

    Ok(Json(ApiResponse::new(UserDeleteResponse {
        id: outcome.user.id,
        folders_deleted: outcome.folders_deleted,
        files_deleted: outcome.files_deleted,
        storage_warnings: outcome.storage_warnings,
    })))
}
