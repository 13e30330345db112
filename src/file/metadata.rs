//! File records and their repository.
//!
//! A record points at its blob through `stored_name` and carries three
//! independent flags: `is_confidential`, `is_archive` and `is_backup`.
//! No combination of flags is forbidden.

use crate::db::DbPool;
use crate::{Result, VaultError};

const FILE_COLUMNS: &str = "id, folder_id, file_name, stored_name, uploaded_by, created_at, \
                            is_confidential, is_archive, is_backup";

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID.
    pub id: i64,
    /// Owning folder; None for confidential uploads.
    pub folder_id: Option<i64>,
    /// Original file name.
    pub file_name: Option<String>,
    /// Blob key; None if the record has no stored content.
    pub stored_name: Option<String>,
    /// Uploader's user ID.
    pub uploaded_by: i64,
    /// Creation timestamp.
    pub created_at: String,
    pub is_confidential: bool,
    pub is_archive: bool,
    pub is_backup: bool,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub folder_id: Option<i64>,
    pub file_name: Option<String>,
    pub stored_name: Option<String>,
    pub uploaded_by: i64,
    pub is_confidential: bool,
}

impl NewFile {
    /// A regular file placed in a folder.
    pub fn in_folder(
        folder_id: i64,
        file_name: impl Into<String>,
        stored_name: impl Into<String>,
        uploaded_by: i64,
    ) -> Self {
        Self {
            folder_id: Some(folder_id),
            file_name: Some(file_name.into()),
            stored_name: Some(stored_name.into()),
            uploaded_by,
            is_confidential: false,
        }
    }

    /// A confidential file with no folder.
    pub fn confidential(
        file_name: impl Into<String>,
        stored_name: impl Into<String>,
        uploaded_by: i64,
    ) -> Self {
        Self {
            folder_id: None,
            file_name: Some(file_name.into()),
            stored_name: Some(stored_name.into()),
            uploaded_by,
            is_confidential: true,
        }
    }
}

/// Repository for file records.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a file record.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (folder_id, file_name, stored_name, uploaded_by, is_confidential)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(file.folder_id)
        .bind(&file.file_name)
        .bind(&file.stored_name)
        .bind(file.uploaded_by)
        .bind(file.is_confidential)
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))
    }

    /// Get a file record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?");
        let file = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(file)
    }

    /// Every file, newest first.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        self.list_where("1 = 1").await
    }

    /// Non-archived files in a folder, newest first.
    pub async fn list_by_folder(&self, folder_id: i64) -> Result<Vec<FileRecord>> {
        self.list_where_id("folder_id = ? AND is_archive = 0", folder_id)
            .await
    }

    /// Every file in a folder regardless of flags.
    pub async fn list_by_folder_all(&self, folder_id: i64) -> Result<Vec<FileRecord>> {
        self.list_where_id("folder_id = ?", folder_id).await
    }

    /// Every file uploaded by a user.
    pub async fn list_by_uploader(&self, user_id: i64) -> Result<Vec<FileRecord>> {
        self.list_where_id("uploaded_by = ?", user_id).await
    }

    /// Archived files, newest first.
    pub async fn list_archived(&self) -> Result<Vec<FileRecord>> {
        self.list_where("is_archive = 1").await
    }

    /// Confidential files, newest first.
    pub async fn list_confidential(&self) -> Result<Vec<FileRecord>> {
        self.list_where("is_confidential = 1").await
    }

    /// Files flagged for backup, newest first.
    pub async fn list_backed_up(&self) -> Result<Vec<FileRecord>> {
        self.list_where("is_backup = 1").await
    }

    /// The `limit` newest files that are neither archived nor confidential.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<FileRecord>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE is_archive = 0 AND is_confidential = 0
             ORDER BY created_at DESC, id DESC
             LIMIT ?"
        );
        let files = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(files)
    }

    /// Set the archive flag. Returns None if the file does not exist.
    pub async fn set_archive(&self, id: i64, archived: bool) -> Result<Option<FileRecord>> {
        self.set_flag("is_archive", id, archived).await
    }

    /// Set the backup flag. Returns None if the file does not exist.
    pub async fn set_backup(&self, id: i64, backed_up: bool) -> Result<Option<FileRecord>> {
        self.set_flag("is_backup", id, backed_up).await
    }

    /// Delete a file record.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of non-archived files in a folder.
    pub async fn count_active_by_folder(&self, folder_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files WHERE folder_id = ? AND is_archive = 0",
        )
        .bind(folder_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(count)
    }

    // `column` is always one of the fixed flag names above.
    async fn set_flag(&self, column: &str, id: i64, value: bool) -> Result<Option<FileRecord>> {
        let sql = format!("UPDATE files SET {column} = ? WHERE id = ?");
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    async fn list_where(&self, filter: &str) -> Result<Vec<FileRecord>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE {filter} ORDER BY created_at DESC, id DESC"
        );
        let files = sqlx::query_as::<_, FileRecord>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(files)
    }

    async fn list_where_id(&self, filter: &str, id: i64) -> Result<Vec<FileRecord>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE {filter} ORDER BY created_at DESC, id DESC"
        );
        let files = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(files)
    }
}
