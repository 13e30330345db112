//! Response DTOs for Web API.
//!
//! Timestamps are converted to RFC 3339 on the way out.

use serde::Serialize;
use utoipa::ToSchema;

use crate::audit::{AuditLog, SystemLog};
use crate::datetime::to_rfc3339;
use crate::db::User;
use crate::file::{humanize_size, FileRecord, Folder};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry in seconds.
    pub expires_in: u64,
    pub user: UserInfo,
}

/// Token refresh response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry in seconds.
    pub expires_in: u64,
}

/// Public user information.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: to_rfc3339(&user.created_at),
        }
    }
}

/// Folder response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    pub id: i64,
    pub name: String,
    pub created_by: i64,
    pub created_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            created_by: folder.created_by,
            created_at: to_rfc3339(&folder.created_at),
        }
    }
}

/// File response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: i64,
    pub folder_id: Option<i64>,
    pub file_name: Option<String>,
    pub uploaded_by: i64,
    pub created_at: String,
    pub is_confidential: bool,
    pub is_archive: bool,
    pub is_backup: bool,
    /// Stored size in bytes; 0 if the content cannot be read.
    pub size: u64,
    pub size_human: String,
}

impl FileResponse {
    /// Build a response from a record and its stored size.
    pub fn from_record(file: FileRecord, size: u64) -> Self {
        Self {
            id: file.id,
            folder_id: file.folder_id,
            file_name: file.file_name,
            uploaded_by: file.uploaded_by,
            created_at: to_rfc3339(&file.created_at),
            is_confidential: file.is_confidential,
            is_archive: file.is_archive,
            is_backup: file.is_backup,
            size,
            size_human: humanize_size(size),
        }
    }
}

/// Result of deleting a file.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileDeleteResponse {
    pub id: i64,
    /// Present when the stored content could not be removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_warning: Option<String>,
}

/// Result of deleting a folder.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderDeleteResponse {
    pub id: i64,
    pub files_deleted: usize,
    pub storage_warnings: Vec<String>,
}

/// Result of deleting a user account.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDeleteResponse {
    pub id: i64,
    pub folders_deleted: usize,
    pub files_deleted: usize,
    pub storage_warnings: Vec<String>,
}

/// Non-archived file count of a folder.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileCountResponse {
    pub folder_id: i64,
    pub file_count: i64,
}

/// Audit log entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogResponse {
    pub id: i64,
    pub info1: Option<String>,
    pub info2: Option<String>,
    pub info3: Option<String>,
    pub info4: Option<String>,
    pub log_date: String,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id,
            info1: log.info1,
            info2: log.info2,
            info3: log.info3,
            info4: log.info4,
            log_date: to_rfc3339(&log.log_date),
        }
    }
}

/// System log entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemLogResponse {
    pub id: i64,
    pub detail: String,
    pub detail_two: Option<String>,
    pub log_date: String,
}

impl From<SystemLog> for SystemLogResponse {
    fn from(log: SystemLog) -> Self {
        Self {
            id: log.id,
            detail: log.detail,
            detail_two: log.detail_two,
            log_date: to_rfc3339(&log.log_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_envelope() {
        let json = serde_json::to_value(ApiResponse::new(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({ "data": [1, 2] }));
    }

    #[test]
    fn test_file_response_from_record() {
        let record = FileRecord {
            id: 7,
            folder_id: Some(3),
            file_name: Some("plan.pdf".to_string()),
            stored_name: Some("ab.pdf".to_string()),
            uploaded_by: 1,
            created_at: "2024-05-01 10:20:30".to_string(),
            is_confidential: false,
            is_archive: true,
            is_backup: false,
        };

        let response = FileResponse::from_record(record, 1536);
        assert_eq!(response.created_at, "2024-05-01T10:20:30Z");
        assert_eq!(response.size_human, "1.50 KB");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("stored_name").is_none());
        assert_eq!(json["is_archive"], true);
    }

    #[test]
    fn test_delete_response_omits_missing_warning() {
        let json = serde_json::to_value(FileDeleteResponse {
            id: 1,
            storage_warning: None,
        })
        .unwrap();
        assert!(json.get("storage_warning").is_none());
    }
}
