//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    archive_file, clear_file_backup, create_audit_log, create_folder, delete_confidential_file,
    delete_file, delete_folder, delete_user, download_file, files_total_size, folder_file_count,
    folder_total_size, get_file, get_folder, get_profile, list_archived_files, list_audit_logs,
    list_backup_files, list_confidential_files, list_files, list_folder_files, list_folders,
    list_non_staff_users, list_recent_files, list_system_logs, login, logout, me, refresh,
    register, rename_folder, set_file_backup, unarchive_file, update_profile,
    upload_confidential_file, upload_folder_file, upload_profile_picture, AppState,
};
use super::middleware::{
    api_rate_limit, create_cors_layer, jwt_auth, login_rate_limit, JwtState, RateLimitState,
};

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main API router, mounted under `/api`.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let upload_limit = DefaultBodyLimit::max(
        usize::try_from(app_state.max_upload_size)
            .unwrap_or(usize::MAX)
            .saturating_add(MULTIPART_OVERHEAD),
    );

    let login_limiter = rate_limit.clone();
    let login_routes = Router::new()
        .route("/login", post(login))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = login_limiter.clone();
            login_rate_limit(state, req, next)
        }));

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .merge(login_routes);

    let profile_routes = Router::new()
        .route("/:user_id", get(get_profile).put(update_profile))
        .route(
            "/:user_id/picture",
            put(upload_profile_picture).layer(upload_limit.clone()),
        );

    let folder_routes = Router::new()
        .route("/", get(list_folders).post(create_folder))
        .route(
            "/:id",
            get(get_folder).put(rename_folder).delete(delete_folder),
        )
        .route("/:id/count", get(folder_file_count))
        .route("/:id/total-size", get(folder_total_size))
        .route(
            "/:id/files",
            get(list_folder_files).post(upload_folder_file.layer(upload_limit.clone())),
        );

    let file_routes = Router::new()
        .route("/", get(list_files))
        .route("/archived", get(list_archived_files))
        .route("/backups", get(list_backup_files))
        .route("/recent", get(list_recent_files))
        .route("/total-size", get(files_total_size))
        .route("/:id", get(get_file).delete(delete_file))
        .route("/:id/download", get(download_file))
        .route("/:id/archive", post(archive_file))
        .route("/:id/unarchive", post(unarchive_file))
        .route("/:id/backup", post(set_file_backup).delete(clear_file_backup));

    let confidential_routes = Router::new()
        .route(
            "/",
            get(list_confidential_files).post(upload_confidential_file.layer(upload_limit)),
        )
        .route("/:id", delete(delete_confidential_file));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/profiles", profile_routes)
        .nest("/folders", folder_routes)
        .nest("/files", file_routes)
        .nest("/confidential", confidential_routes)
        .route("/logs", get(list_audit_logs).post(create_audit_log))
        .route("/system-logs", get(list_system_logs))
        .route("/users/non-staff", get(list_non_staff_users))
        .route("/users/:id", delete(delete_user))
        .layer(middleware::from_fn(move |req, next| {
            let state = rate_limit.clone();
            api_rate_limit(state, req, next)
        }));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
