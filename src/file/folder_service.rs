//! Folder manager.
//!
//! Deleting a folder is two-phase: every owned file's blob and record go
//! first, then the folder row. Row cascades alone would leave blobs behind.

use tracing::info;

use crate::db::{Database, UserRepository};
use crate::{Result, VaultError};

use super::folder::{Folder, FolderRepository, NewFolder};
use super::metadata::FileRepository;
use super::service::FileService;
use super::size::{SizeLadder, SizeSummary};
use super::storage::BlobStore;
use super::MAX_FOLDER_NAME_LENGTH;

/// Result of deleting a folder.
#[derive(Debug, Clone)]
pub struct FolderDeleteOutcome {
    /// The folder as it was before deletion.
    pub folder: Folder,
    /// Number of file records removed with it.
    pub files_deleted: usize,
    /// One entry per blob that could not be removed.
    pub storage_warnings: Vec<String>,
}

/// Folder manager.
pub struct FolderService<'a> {
    db: &'a Database,
    store: &'a dyn BlobStore,
}

impl<'a> FolderService<'a> {
    /// Create a new FolderService.
    pub fn new(db: &'a Database, store: &'a dyn BlobStore) -> Self {
        Self { db, store }
    }

    /// Create a folder owned by `creator_id`.
    pub async fn create(&self, name: &str, creator_id: i64) -> Result<Folder> {
        let name = normalize_name(name)?;

        UserRepository::new(self.db.pool())
            .require(creator_id)
            .await?;

        let folder = FolderRepository::new(self.db.pool())
            .create(&NewFolder::new(name, creator_id))
            .await?;
        info!(folder_id = folder.id, creator_id, "Folder created");
        Ok(folder)
    }

    /// Get a folder.
    pub async fn get(&self, folder_id: i64) -> Result<Folder> {
        FolderRepository::new(self.db.pool())
            .get_by_id(folder_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("folder".to_string()))
    }

    /// Every folder, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Folder>> {
        FolderRepository::new(self.db.pool()).list_all().await
    }

    /// Rename a folder. The new name is trimmed and must not be empty.
    ///
    /// A missing folder is reported before a bad name.
    pub async fn rename(&self, folder_id: i64, new_name: &str) -> Result<Folder> {
        self.get(folder_id).await?;
        let name = normalize_name(new_name)?;

        let folder = FolderRepository::new(self.db.pool())
            .rename(folder_id, name)
            .await?
            .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;
        info!(folder_id, "Folder renamed");
        Ok(folder)
    }

    /// Delete a folder with all of its files, archived ones included.
    pub async fn delete(&self, folder_id: i64) -> Result<FolderDeleteOutcome> {
        let folder = self.get(folder_id).await?;
        let files = FileRepository::new(self.db.pool())
            .list_by_folder_all(folder_id)
            .await?;

        let file_service = FileService::new(self.db, self.store);
        let files_deleted = files.len();
        let mut storage_warnings = Vec::new();
        for file in files {
            let outcome = file_service.delete_record(file).await?;
            storage_warnings.extend(outcome.storage_warning);
        }

        FolderRepository::new(self.db.pool()).delete(folder_id).await?;
        info!(
            folder_id,
            files_deleted,
            storage_failures = storage_warnings.len(),
            "Folder deleted"
        );

        Ok(FolderDeleteOutcome {
            folder,
            files_deleted,
            storage_warnings,
        })
    }

    /// Number of non-archived files in a folder.
    pub async fn file_count(&self, folder_id: i64) -> Result<i64> {
        self.get(folder_id).await?;
        FileRepository::new(self.db.pool())
            .count_active_by_folder(folder_id)
            .await
    }

    /// Total size of the non-archived files in a folder, on the B..GB ladder.
    pub async fn total_size(&self, folder_id: i64) -> Result<SizeSummary> {
        self.get(folder_id).await?;
        let files = FileRepository::new(self.db.pool())
            .list_by_folder(folder_id)
            .await?;

        let file_service = FileService::new(self.db, self.store);
        let total = files.iter().map(|f| file_service.size_of(f)).sum();
        Ok(SizeSummary::new(total, SizeLadder::Folder))
    }
}

fn normalize_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VaultError::InvalidInput(
            "folder name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_FOLDER_NAME_LENGTH {
        return Err(VaultError::Validation(format!(
            "folder name must be at most {MAX_FOLDER_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::file::test_support::BrokenStore;
    use crate::file::{FileStorage, UploadRequest};
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Database, FileStorage, i64) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("bob", "hash"))
            .await
            .unwrap();
        (temp_dir, db, storage, user.id)
    }

    fn blob_count(storage: &FileStorage) -> usize {
        std::fs::read_dir(storage.base_path())
            .unwrap()
            .flatten()
            .map(|shard| std::fs::read_dir(shard.path()).unwrap().count())
            .sum()
    }

    #[tokio::test]
    async fn test_create_folder() {
        let (_tmp, db, storage, user_id) = setup().await;
        let service = FolderService::new(&db, &storage);

        let folder = service.create("  Invoices ", user_id).await.unwrap();
        assert_eq!(folder.name, "Invoices");
        assert_eq!(folder.created_by, user_id);
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_folder_unknown_creator() {
        let (_tmp, db, storage, _) = setup().await;
        let service = FolderService::new(&db, &storage);

        assert!(matches!(
            service.create("Invoices", 999).await,
            Err(VaultError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rename() {
        let (_tmp, db, storage, user_id) = setup().await;
        let service = FolderService::new(&db, &storage);
        let folder = service.create("Old", user_id).await.unwrap();

        let renamed = service.rename(folder.id, "New").await.unwrap();
        assert_eq!(renamed.name, "New");

        assert!(matches!(
            service.rename(folder.id, "   ").await,
            Err(VaultError::InvalidInput(_))
        ));
        assert!(matches!(
            service.rename(999, "Other").await,
            Err(VaultError::NotFound(_))
        ));
        assert!(matches!(
            service.rename(999, "").await,
            Err(VaultError::NotFound(_))
        ));
        assert_eq!(service.get(folder.id).await.unwrap().name, "New");
    }

    #[tokio::test]
    async fn test_delete_leaves_no_blobs() {
        let (_tmp, db, storage, user_id) = setup().await;
        let service = FolderService::new(&db, &storage);
        let files = FileService::new(&db, &storage);
        let folder = service.create("Doomed", user_id).await.unwrap();

        for i in 0..3 {
            files
                .upload(&UploadRequest::new(
                    folder.id,
                    user_id,
                    format!("{i}.pdf"),
                    vec![1; 10],
                ))
                .await
                .unwrap();
        }
        let archived = files
            .upload(&UploadRequest::new(folder.id, user_id, "old.pdf", vec![1; 10]))
            .await
            .unwrap();
        files.archive(archived.id).await.unwrap();
        assert_eq!(blob_count(&storage), 4);

        let outcome = service.delete(folder.id).await.unwrap();

        assert_eq!(outcome.files_deleted, 4);
        assert!(outcome.storage_warnings.is_empty());
        assert_eq!(blob_count(&storage), 0);
        assert!(files.list_all().await.unwrap().is_empty());
        assert!(matches!(
            service.get(folder.id).await,
            Err(VaultError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_with_broken_storage_reports_warnings() {
        let (_tmp, db, storage, user_id) = setup().await;
        let broken = BrokenStore {
            inner: storage.clone(),
        };
        let service = FolderService::new(&db, &broken);
        let folder = service.create("Shaky", user_id).await.unwrap();
        FileService::new(&db, &broken)
            .upload(&UploadRequest::new(folder.id, user_id, "a.png", vec![1]))
            .await
            .unwrap();

        let outcome = service.delete(folder.id).await.unwrap();

        assert_eq!(outcome.files_deleted, 1);
        assert_eq!(outcome.storage_warnings.len(), 1);
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_folder() {
        let (_tmp, db, storage, _) = setup().await;
        let service = FolderService::new(&db, &storage);

        assert!(matches!(
            service.delete(999).await,
            Err(VaultError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_file_count_excludes_archived() {
        let (_tmp, db, storage, user_id) = setup().await;
        let service = FolderService::new(&db, &storage);
        let files = FileService::new(&db, &storage);
        let folder = service.create("Counted", user_id).await.unwrap();

        let mut ids = Vec::new();
        for i in 0..2 {
            let f = files
                .upload(&UploadRequest::new(
                    folder.id,
                    user_id,
                    format!("{i}.pdf"),
                    vec![1],
                ))
                .await
                .unwrap();
            ids.push(f.id);
        }
        assert_eq!(service.file_count(folder.id).await.unwrap(), 2);

        for id in ids {
            files.archive(id).await.unwrap();
        }
        assert_eq!(service.file_count(folder.id).await.unwrap(), 0);
        assert!(matches!(
            service.file_count(999).await,
            Err(VaultError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_total_size_excludes_archived() {
        let (_tmp, db, storage, user_id) = setup().await;
        let service = FolderService::new(&db, &storage);
        let files = FileService::new(&db, &storage);
        let folder = service.create("Sized", user_id).await.unwrap();

        files
            .upload(&UploadRequest::new(folder.id, user_id, "n.pdf", vec![0; 2048]))
            .await
            .unwrap();
        let archived = files
            .upload(&UploadRequest::new(folder.id, user_id, "a.pdf", vec![0; 4096]))
            .await
            .unwrap();
        files.archive(archived.id).await.unwrap();

        let summary = service.total_size(folder.id).await.unwrap();
        assert_eq!(summary.bytes, 2048);
        assert_eq!(summary.human, "2.00 KB");
    }

    #[tokio::test]
    async fn test_total_size_with_unreadable_files() {
        let (_tmp, db, storage, user_id) = setup().await;
        let broken = BrokenStore {
            inner: storage.clone(),
        };
        let service = FolderService::new(&db, &broken);
        let folder = service.create("Dark", user_id).await.unwrap();
        FileService::new(&db, &broken)
            .upload(&UploadRequest::new(folder.id, user_id, "a.pdf", vec![0; 99]))
            .await
            .unwrap();

        let summary = service.total_size(folder.id).await.unwrap();
        assert_eq!(summary.bytes, 0);
        assert_eq!(summary.human, "0 B");
    }
}
