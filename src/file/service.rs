//! File lifecycle manager.
//!
//! Handles uploads, the archive and backup flags, deletion, read views and
//! size aggregation. Blob removal is best-effort: a storage failure is
//! logged and recorded in the system log, but never blocks removing the
//! record.

use tracing::{debug, info, warn};

use crate::audit::LogRepository;
use crate::db::{Database, UserRepository};
use crate::{Result, VaultError};

use super::folder::FolderRepository;
use super::metadata::{FileRecord, FileRepository, NewFile};
use super::size::{humanize_size, SizeLadder, SizeSummary};
use super::storage::BlobStore;
use super::upload::UploadClass;
use super::{DEFAULT_MAX_FILE_SIZE, MAX_FILENAME_LENGTH};

/// Request data for a folder upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Target folder.
    pub folder_id: i64,
    /// Uploading user.
    pub uploader_id: i64,
    /// Name the content arrived with. Its extension is checked.
    pub original_name: String,
    /// Name to record instead of the original one.
    pub declared_name: Option<String>,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(
        folder_id: i64,
        uploader_id: i64,
        original_name: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            folder_id,
            uploader_id,
            original_name: original_name.into(),
            declared_name: None,
            content,
        }
    }

    /// Record the file under a different name.
    pub fn with_declared_name(mut self, name: impl Into<String>) -> Self {
        self.declared_name = Some(name.into());
        self
    }

    /// The name that ends up on the record.
    fn record_name(&self) -> &str {
        record_name(self.declared_name.as_deref(), &self.original_name)
    }
}

/// The trimmed declared name, or the original one when none (or a blank one)
/// was given.
fn record_name<'n>(declared_name: Option<&'n str>, original_name: &'n str) -> &'n str {
    declared_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(original_name)
}

/// Result of deleting a file.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    /// The record as it was before deletion.
    pub file: FileRecord,
    /// Set when the blob could not be removed.
    pub storage_warning: Option<String>,
}

/// File lifecycle manager.
pub struct FileService<'a> {
    db: &'a Database,
    store: &'a dyn BlobStore,
    max_file_size: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(db: &'a Database, store: &'a dyn BlobStore) -> Self {
        Self {
            db,
            store,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create a new FileService with a custom max file size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Upload a file into a folder.
    ///
    /// # Errors
    /// - `InvalidInput` for empty content
    /// - `Validation` for an oversized file, an over-long name or a
    ///   disallowed extension
    /// - `NotFound` if the uploader or the folder does not exist
    pub async fn upload(&self, request: &UploadRequest) -> Result<FileRecord> {
        let name = request.record_name();
        self.check_upload(&request.original_name, name, &request.content)?;

        UserRepository::new(self.db.pool())
            .require(request.uploader_id)
            .await?;
        FolderRepository::new(self.db.pool())
            .get_by_id(request.folder_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;

        let stored_name = self
            .store
            .store(&request.content, &request.original_name)?;
        let new_file =
            NewFile::in_folder(request.folder_id, name, &stored_name, request.uploader_id);

        let file = self.record_or_discard(&new_file, &stored_name).await?;
        info!(
            file_id = file.id,
            folder_id = request.folder_id,
            uploader_id = request.uploader_id,
            size = request.content.len(),
            "File uploaded"
        );
        Ok(file)
    }

    /// Upload a confidential file. No folder is involved.
    ///
    /// `declared_name` replaces `file_name` on the record the same way it does
    /// for folder uploads; the extension is always checked on `file_name`.
    pub async fn upload_confidential(
        &self,
        uploader_id: i64,
        file_name: &str,
        declared_name: Option<&str>,
        content: &[u8],
    ) -> Result<FileRecord> {
        let name = record_name(declared_name, file_name);
        self.check_upload(file_name, name, content)?;

        UserRepository::new(self.db.pool())
            .require(uploader_id)
            .await?;

        let stored_name = self.store.store(content, file_name)?;
        let new_file = NewFile::confidential(name, &stored_name, uploader_id);

        let file = self.record_or_discard(&new_file, &stored_name).await?;
        info!(
            file_id = file.id,
            uploader_id,
            size = content.len(),
            "Confidential file uploaded"
        );
        Ok(file)
    }

    fn check_upload(&self, original_name: &str, record_name: &str, content: &[u8]) -> Result<()> {
        if content.is_empty() {
            return Err(VaultError::InvalidInput("file content is empty".to_string()));
        }

        if content.len() as u64 > self.max_file_size {
            return Err(VaultError::Validation(format!(
                "file is too large (max {})",
                humanize_size(self.max_file_size)
            )));
        }

        if record_name.chars().count() > MAX_FILENAME_LENGTH {
            return Err(VaultError::Validation(format!(
                "file name must be at most {MAX_FILENAME_LENGTH} characters"
            )));
        }

        UploadClass::FolderFile.validate(original_name)
    }

    async fn record_or_discard(&self, new_file: &NewFile, stored_name: &str) -> Result<FileRecord> {
        match FileRepository::new(self.db.pool()).create(new_file).await {
            Ok(file) => Ok(file),
            Err(e) => {
                if let Err(cleanup) = self.store.delete(stored_name) {
                    warn!(key = stored_name, error = %cleanup, "Failed to remove blob of rejected upload");
                }
                Err(e)
            }
        }
    }

    /// Mark a file archived. Archiving an archived file succeeds unchanged.
    pub async fn archive(&self, file_id: i64) -> Result<FileRecord> {
        let file = FileRepository::new(self.db.pool())
            .set_archive(file_id, true)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
        info!(file_id, "File archived");
        Ok(file)
    }

    /// Clear the archive flag.
    pub async fn unarchive(&self, file_id: i64) -> Result<FileRecord> {
        let file = FileRepository::new(self.db.pool())
            .set_archive(file_id, false)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
        info!(file_id, "File unarchived");
        Ok(file)
    }

    /// Mark a file for backup.
    pub async fn set_backup(&self, file_id: i64) -> Result<FileRecord> {
        let file = FileRepository::new(self.db.pool())
            .set_backup(file_id, true)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
        info!(file_id, "File marked for backup");
        Ok(file)
    }

    /// Clear the backup flag.
    pub async fn clear_backup(&self, file_id: i64) -> Result<FileRecord> {
        let file = FileRepository::new(self.db.pool())
            .set_backup(file_id, false)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
        info!(file_id, "File backup flag cleared");
        Ok(file)
    }

    /// Delete a file's blob, then its record.
    pub async fn delete(&self, file_id: i64) -> Result<DeleteOutcome> {
        let file = self.get(file_id).await?;
        self.delete_record(file).await
    }

    /// Delete a confidential file. Non-confidential files are `NotFound`.
    pub async fn delete_confidential(&self, file_id: i64) -> Result<DeleteOutcome> {
        let file = self.get(file_id).await?;
        if !file.is_confidential {
            return Err(VaultError::NotFound("confidential file".to_string()));
        }
        self.delete_record(file).await
    }

    pub(crate) async fn delete_record(&self, file: FileRecord) -> Result<DeleteOutcome> {
        let storage_warning = match file.stored_name.as_deref() {
            Some(key) => self.discard_blob(key).await,
            None => None,
        };

        FileRepository::new(self.db.pool()).delete(file.id).await?;
        info!(file_id = file.id, "File deleted");

        Ok(DeleteOutcome {
            file,
            storage_warning,
        })
    }

    /// Remove a blob, swallowing failures.
    ///
    /// A failure is logged at `warn`, appended to the system log and returned
    /// as a message. An already-missing blob is not a failure.
    pub async fn discard_blob(&self, key: &str) -> Option<String> {
        match self.store.delete(key) {
            Ok(true) => None,
            Ok(false) => {
                debug!(key, "Blob already absent");
                None
            }
            Err(e) => {
                let message = format!("failed to delete stored content {key}: {e}");
                warn!(key, error = %e, "Failed to delete blob");
                if let Err(log_err) = LogRepository::new(self.db.pool())
                    .create_system("Failed to delete stored file", Some(&message))
                    .await
                {
                    warn!(error = %log_err, "Failed to record storage failure");
                }
                Some(message)
            }
        }
    }

    /// Get a file record.
    pub async fn get(&self, file_id: i64) -> Result<FileRecord> {
        FileRepository::new(self.db.pool())
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))
    }

    /// Get a file record together with its content.
    pub async fn load(&self, file_id: i64) -> Result<(FileRecord, Vec<u8>)> {
        let file = self.get(file_id).await?;
        let key = file
            .stored_name
            .as_deref()
            .ok_or_else(|| VaultError::NotFound("file content".to_string()))?;
        let content = self.store.load(key)?;
        Ok((file, content))
    }

    /// Every file.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        FileRepository::new(self.db.pool()).list_all().await
    }

    /// Non-archived files of a folder. `NotFound` if the folder does not exist.
    pub async fn list_non_archived(&self, folder_id: i64) -> Result<Vec<FileRecord>> {
        FolderRepository::new(self.db.pool())
            .get_by_id(folder_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;
        FileRepository::new(self.db.pool())
            .list_by_folder(folder_id)
            .await
    }

    pub async fn list_archived(&self) -> Result<Vec<FileRecord>> {
        FileRepository::new(self.db.pool()).list_archived().await
    }

    pub async fn list_confidential(&self) -> Result<Vec<FileRecord>> {
        FileRepository::new(self.db.pool()).list_confidential().await
    }

    pub async fn list_backed_up(&self) -> Result<Vec<FileRecord>> {
        FileRepository::new(self.db.pool()).list_backed_up().await
    }

    /// The `limit` newest files that are neither archived nor confidential.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<FileRecord>> {
        FileRepository::new(self.db.pool()).list_recent(limit).await
    }

    /// Stored byte length of a file; 0 when there is no content or it cannot
    /// be read.
    pub fn size_of(&self, file: &FileRecord) -> u64 {
        let Some(key) = file.stored_name.as_deref() else {
            return 0;
        };
        match self.store.size_of(key) {
            Ok(size) => size,
            Err(e) => {
                debug!(file_id = file.id, key, error = %e, "Unreadable blob counted as 0 bytes");
                0
            }
        }
    }

    /// Format a byte count on the full ladder.
    pub fn humanize_size(&self, bytes: u64) -> String {
        humanize_size(bytes)
    }

    /// Total size of every file regardless of folder or flags.
    pub async fn global_total_size(&self) -> Result<SizeSummary> {
        let files = self.list_all().await?;
        let total = files.iter().map(|f| self.size_of(f)).sum();
        Ok(SizeSummary::new(total, SizeLadder::Full))
    }
}
