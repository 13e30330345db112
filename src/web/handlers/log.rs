//! Audit and system log handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::audit::{LogRepository, NewAuditLog};
use crate::web::dto::{
    ApiResponse, AuditLogResponse, CreateLogRequest, SystemLogResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, StaffUser};

use super::AppState;

/// GET /api/logs - Audit log, newest first.
#[utoipa::path(
    get,
    path = "/logs",
    tag = "logs",
    responses(
        (status = 200, description = "Audit log", body = Vec<AuditLogResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<AuditLogResponse>>>, ApiError> {
    let logs = LogRepository::new(state.db.pool()).list_audit().await?;
    Ok(Json(ApiResponse::new(
        logs.into_iter().map(AuditLogResponse::from).collect(),
    )))
}

/// POST /api/logs - Append an audit entry.
#[utoipa::path(
    post,
    path = "/logs",
    tag = "logs",
    request_body = CreateLogRequest,
    responses(
        (status = 201, description = "Entry recorded", body = AuditLogResponse),
        (status = 400, description = "Every field is empty"),
        (status = 422, description = "Validation failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_audit_log(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuditLogResponse>>), ApiError> {
    let entry = NewAuditLog {
        info1: req.info1,
        info2: req.info2,
        info3: req.info3,
        info4: req.info4,
    };
    if entry.is_empty() {
        return Err(ApiError::bad_request("At least one field is required"));
    }

    let log = LogRepository::new(state.db.pool())
        .create_audit(&entry)
        .await?;
    tracing::debug!(log_id = log.id, user_id = claims.sub, "Audit entry recorded");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AuditLogResponse::from(log))),
    ))
}

/// GET /api/system-logs - Server-generated log, newest first (staff only).
#[utoipa::path(
    get,
    path = "/system-logs",
    tag = "logs",
    responses(
        (status = 200, description = "System log", body = Vec<SystemLogResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_system_logs(
    State(state): State<Arc<AppState>>,
    StaffUser(_claims): StaffUser,
) -> Result<Json<ApiResponse<Vec<SystemLogResponse>>>, ApiError> {
    let logs = LogRepository::new(state.db.pool()).list_system().await?;
    Ok(Json(ApiResponse::new(
        logs.into_iter().map(SystemLogResponse::from).collect(),
    )))
}
