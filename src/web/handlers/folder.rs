//! Folder handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::file::{SizeSummary, UploadRequest};
use crate::web::dto::{
    ApiResponse, FileCountResponse, FileResponse, FolderDeleteResponse, FolderNameRequest,
    FolderResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::{read_upload_form, AppState};

/// GET /api/folders - List all folders.
#[utoipa::path(
    get,
    path = "/folders",
    tag = "folders",
    responses(
        (status = 200, description = "All folders", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let folders = state.folders().list_all().await?;
    Ok(Json(ApiResponse::new(
        folders.into_iter().map(FolderResponse::from).collect(),
    )))
}

/// POST /api/folders - Create a folder owned by the caller.
#[utoipa::path(
    post,
    path = "/folders",
    tag = "folders",
    request_body = FolderNameRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderResponse),
        (status = 400, description = "Missing or blank name"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Name too long")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(req): Json<FolderNameRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let name = req.name.unwrap_or_default();
    let folder = state.folders().create(&name, claims.sub).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderResponse::from(folder))),
    ))
}

/// GET /api/folders/:id - Get a folder.
#[utoipa::path(
    get,
    path = "/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder", body = FolderResponse),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let folder = state.folders().get(folder_id).await?;
    Ok(Json(ApiResponse::new(FolderResponse::from(folder))))
}

/// PUT /api/folders/:id - Rename a folder.
#[utoipa::path(
    put,
    path = "/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    request_body = FolderNameRequest,
    responses(
        (status = 200, description = "Folder renamed", body = FolderResponse),
        (status = 400, description = "Missing or blank name"),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rename_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(folder_id): Path<i64>,
    Json(req): Json<FolderNameRequest>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let name = req.name.unwrap_or_default();
    let folder = state.folders().rename(folder_id, &name).await?;
    Ok(Json(ApiResponse::new(FolderResponse::from(folder))))
}

/// DELETE /api/folders/:id - Delete a folder and every file in it.
#[utoipa::path(
    delete,
    path = "/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder deleted", body = FolderDeleteResponse),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderDeleteResponse>>, ApiError> {
    let outcome = state.folders().delete(folder_id).await?;
    tracing::info!(folder_id, user_id = claims.sub, "Folder deleted via API");

    Ok(Json(ApiResponse::new(FolderDeleteResponse {
        id: outcome.folder.id,
        files_deleted: outcome.files_deleted,
        storage_warnings: outcome.storage_warnings,
    })))
}

/// GET /api/folders/:id/count - Number of non-archived files.
#[utoipa::path(
    get,
    path = "/folders/{id}/count",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "File count", body = FileCountResponse),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn folder_file_count(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FileCountResponse>>, ApiError> {
    let file_count = state.folders().file_count(folder_id).await?;
    Ok(Json(ApiResponse::new(FileCountResponse {
        folder_id,
        file_count,
    })))
}

/// GET /api/folders/:id/total-size - Total size of non-archived files.
#[utoipa::path(
    get,
    path = "/folders/{id}/total-size",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Total size", body = SizeSummary),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn folder_total_size(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<SizeSummary>>, ApiError> {
    let summary = state.folders().total_size(folder_id).await?;
    Ok(Json(ApiResponse::new(summary)))
}

/// GET /api/folders/:id/files - Non-archived files of a folder.
#[utoipa::path(
    get,
    path = "/folders/{id}/files",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Files", body = Vec<FileResponse>),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_folder_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.files();
    let records = files.list_non_archived(folder_id).await?;
    Ok(Json(ApiResponse::new(super::file::to_responses(
        &files, records,
    ))))
}

/// POST /api/folders/:id/files - Upload a file into a folder.
///
/// Request body: multipart/form-data with a "file" field and an optional
/// "file_name" field overriding the recorded name.
#[utoipa::path(
    post,
    path = "/folders/{id}/files",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 400, description = "No file or empty file"),
        (status = 404, description = "Folder not found"),
        (status = 413, description = "Request body too large"),
        (status = 422, description = "Extension not allowed, name or file too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_folder_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(folder_id): Path<i64>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let (file_name, content, declared_name) = read_upload_form(multipart).await?.into_file()?;
    let size = content.len() as u64;

    let mut request = UploadRequest::new(folder_id, claims.sub, file_name, content);
    if let Some(name) = declared_name {
        request = request.with_declared_name(name);
    }

    let file = state.files().upload(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from_record(file, size))),
    ))
}
