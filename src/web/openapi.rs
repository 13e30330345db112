//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::ProfileView;
use crate::file::SizeSummary;
use crate::web::dto::{
    AuditLogResponse, CreateLogRequest, FileCountResponse, FileDeleteResponse, FileResponse,
    FolderDeleteResponse, FolderNameRequest, FolderResponse, LoginRequest, LoginResponse,
    LogoutRequest, RefreshRequest, RefreshResponse, RegisterRequest, SystemLogResponse,
    UpdateProfileRequest, UserDeleteResponse, UserInfo,
};
use crate::web::error::{ErrorBody, ErrorCode, ErrorDetail};
use crate::web::handlers::{auth, file, folder, log, profile, user};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::refresh,
        auth::me,
        // Profiles
        profile::get_profile,
        profile::update_profile,
        profile::upload_profile_picture,
        // Folders
        folder::list_folders,
        folder::create_folder,
        folder::get_folder,
        folder::rename_folder,
        folder::delete_folder,
        folder::folder_file_count,
        folder::folder_total_size,
        folder::list_folder_files,
        folder::upload_folder_file,
        // Files
        file::list_files,
        file::list_archived_files,
        file::list_backup_files,
        file::list_recent_files,
        file::files_total_size,
        file::get_file,
        file::download_file,
        file::delete_file,
        file::archive_file,
        file::unarchive_file,
        file::set_file_backup,
        file::clear_file_backup,
        // Confidential
        file::list_confidential_files,
        file::upload_confidential_file,
        file::delete_confidential_file,
        // Logs
        log::list_audit_logs,
        log::create_audit_log,
        log::list_system_logs,
        // Users
        user::list_non_staff_users,
        user::delete_user,
    ),
    components(
        schemas(
            ErrorCode,
            ErrorBody,
            ErrorDetail,
            LoginRequest,
            LogoutRequest,
            RefreshRequest,
            RegisterRequest,
            UpdateProfileRequest,
            FolderNameRequest,
            CreateLogRequest,
            LoginResponse,
            RefreshResponse,
            UserInfo,
            ProfileView,
            FolderResponse,
            FileResponse,
            FileDeleteResponse,
            FolderDeleteResponse,
            UserDeleteResponse,
            FileCountResponse,
            SizeSummary,
            AuditLogResponse,
            SystemLogResponse,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and token management"),
        (name = "profiles", description = "User profiles"),
        (name = "folders", description = "Folders and folder uploads"),
        (name = "files", description = "File lifecycle and downloads"),
        (name = "confidential", description = "Confidential files"),
        (name = "logs", description = "Audit and system logs"),
        (name = "users", description = "User administration (staff only)"),
    ),
    modifiers(&SecurityAddon),
    servers(
        (url = "/api", description = "API base path")
    ),
    info(
        title = "docvault API",
        version = "0.1.0",
        description = "Folders, file lifecycle states and audit logs",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/swagger-ui`, document at `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
