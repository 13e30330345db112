//! File handlers.
//!
//! Covers the lifecycle transitions, the read views, downloads and the
//! confidential area.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, Response, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::file::{DeleteOutcome, FileRecord, FileService, SizeSummary, DEFAULT_RECENT_LIMIT};
use crate::web::dto::{ApiResponse, FileDeleteResponse, FileResponse, RecentQuery};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::{read_upload_form, AppState};

const MAX_RECENT_LIMIT: u32 = 100;

/// Build a Content-Disposition header value.
///
/// ASCII names use the plain form; anything else gets an RFC 5987
/// `filename*` parameter next to a sanitized fallback.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized,
        urlencoding::encode(filename)
    )
}

fn to_response(files: &FileService<'_>, record: FileRecord) -> FileResponse {
    let size = files.size_of(&record);
    FileResponse::from_record(record, size)
}

pub(crate) fn to_responses(files: &FileService<'_>, records: Vec<FileRecord>) -> Vec<FileResponse> {
    records
        .into_iter()
        .map(|record| to_response(files, record))
        .collect()
}

fn delete_response(outcome: DeleteOutcome) -> FileDeleteResponse {
    FileDeleteResponse {
        id: outcome.file.id,
        storage_warning: outcome.storage_warning,
    }
}

/// GET /api/files - Every file record.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All files", body = Vec<FileResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.files();
    let records = files.list_all().await?;
    Ok(Json(ApiResponse::new(to_responses(&files, records))))
}

/// GET /api/files/archived - Archived files.
#[utoipa::path(
    get,
    path = "/files/archived",
    tag = "files",
    responses(
        (status = 200, description = "Archived files", body = Vec<FileResponse>)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_archived_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.files();
    let records = files.list_archived().await?;
    Ok(Json(ApiResponse::new(to_responses(&files, records))))
}

/// GET /api/files/backups - Files flagged for backup.
#[utoipa::path(
    get,
    path = "/files/backups",
    tag = "files",
    responses(
        (status = 200, description = "Backed-up files", body = Vec<FileResponse>)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_backup_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.files();
    let records = files.list_backed_up().await?;
    Ok(Json(ApiResponse::new(to_responses(&files, records))))
}

/// GET /api/files/recent - Most recent active, non-confidential files.
#[utoipa::path(
    get,
    path = "/files/recent",
    tag = "files",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent files", body = Vec<FileResponse>)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recent_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);

    let files = state.files();
    let records = files.list_recent(limit).await?;
    Ok(Json(ApiResponse::new(to_responses(&files, records))))
}

/// GET /api/files/total-size - Size of every stored file.
#[utoipa::path(
    get,
    path = "/files/total-size",
    tag = "files",
    responses(
        (status = 200, description = "Total size", body = SizeSummary)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn files_total_size(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<ApiResponse<SizeSummary>>, ApiError> {
    let summary = state.files().global_total_size().await?;
    Ok(Json(ApiResponse::new(summary)))
}

/// GET /api/files/:id - File metadata.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File", body = FileResponse),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let files = state.files();
    let record = files.get(file_id).await?;
    Ok(Json(ApiResponse::new(to_response(&files, record))))
}

/// GET /api/files/:id/download - File content.
#[utoipa::path(
    get,
    path = "/files/{id}/download",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let (file, content) = state.files().load(file_id).await?;
    let file_name = file.file_name.unwrap_or_else(|| format!("file-{}", file.id));

    let content_type = mime_guess::from_path(&file_name)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&file_name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// DELETE /api/files/:id - Delete a file and its content.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = FileDeleteResponse),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileDeleteResponse>>, ApiError> {
    let outcome = state.files().delete(file_id).await?;
    tracing::info!(file_id, user_id = claims.sub, "File deleted via API");
    Ok(Json(ApiResponse::new(delete_response(outcome))))
}

/// POST /api/files/:id/archive
#[utoipa::path(
    post,
    path = "/files/{id}/archive",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File archived", body = FileResponse),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn archive_file(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let files = state.files();
    let record = files.archive(file_id).await?;
    Ok(Json(ApiResponse::new(to_response(&files, record))))
}

/// POST /api/files/:id/unarchive
#[utoipa::path(
    post,
    path = "/files/{id}/unarchive",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File restored", body = FileResponse),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unarchive_file(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let files = state.files();
    let record = files.unarchive(file_id).await?;
    Ok(Json(ApiResponse::new(to_response(&files, record))))
}

/// POST /api/files/:id/backup
#[utoipa::path(
    post,
    path = "/files/{id}/backup",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File flagged for backup", body = FileResponse),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_file_backup(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let files = state.files();
    let record = files.set_backup(file_id).await?;
    Ok(Json(ApiResponse::new(to_response(&files, record))))
}

/// DELETE /api/files/:id/backup
#[utoipa::path(
    delete,
    path = "/files/{id}/backup",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Backup flag cleared", body = FileResponse),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn clear_file_backup(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let files = state.files();
    let record = files.clear_backup(file_id).await?;
    Ok(Json(ApiResponse::new(to_response(&files, record))))
}

/// GET /api/confidential - Confidential files.
#[utoipa::path(
    get,
    path = "/confidential",
    tag = "confidential",
    responses(
        (status = 200, description = "Confidential files", body = Vec<FileResponse>)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_confidential_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.files();
    let records = files.list_confidential().await?;
    Ok(Json(ApiResponse::new(to_responses(&files, records))))
}

/// POST /api/confidential - Upload a confidential file.
///
/// Request body: multipart/form-data with a "file" field and an optional
/// "file_name" field naming the record.
#[utoipa::path(
    post,
    path = "/confidential",
    tag = "confidential",
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 400, description = "No file or empty file"),
        (status = 413, description = "Request body too large"),
        (status = 422, description = "Extension not allowed or file too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_confidential_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let (file_name, content, declared_name) = read_upload_form(multipart).await?.into_file()?;

    let record = state
        .files()
        .upload_confidential(claims.sub, &file_name, declared_name.as_deref(), &content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from_record(
            record,
            content.len() as u64,
        ))),
    ))
}

/// DELETE /api/confidential/:id - Delete a confidential file.
#[utoipa::path(
    delete,
    path = "/confidential/{id}",
    tag = "confidential",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = FileDeleteResponse),
        (status = 404, description = "Confidential file not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_confidential_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileDeleteResponse>>, ApiError> {
    let outcome = state.files().delete_confidential(file_id).await?;
    tracing::info!(file_id, user_id = claims.sub, "Confidential file deleted via API");
    Ok(Json(ApiResponse::new(delete_response(outcome))))
}
