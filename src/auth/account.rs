//! Account removal.
//!
//! Row cascades would drop a user's folders, files and profile, but not the
//! blobs behind them. Everything with stored content is therefore deleted
//! through the managers first, then the user row.

use tracing::info;

use crate::auth::profile::ProfileRepository;
use crate::db::{Database, User, UserRepository};
use crate::file::{BlobStore, FileRepository, FileService, FolderRepository, FolderService};
use crate::Result;

/// Result of deleting an account.
#[derive(Debug, Clone)]
pub struct AccountDeleteOutcome {
    /// The user as it was before deletion.
    pub user: User,
    pub folders_deleted: usize,
    /// File records removed, including those inside the deleted folders.
    pub files_deleted: usize,
    /// One entry per blob that could not be removed.
    pub storage_warnings: Vec<String>,
}

/// Delete a user with every folder they created, every file they uploaded
/// and their profile picture.
pub async fn delete_account(
    db: &Database,
    store: &dyn BlobStore,
    user_id: i64,
) -> Result<AccountDeleteOutcome> {
    let user = UserRepository::new(db.pool()).require(user_id).await?;

    let folder_service = FolderService::new(db, store);
    let file_service = FileService::new(db, store);
    let mut files_deleted = 0;
    let mut storage_warnings = Vec::new();

    let folders = FolderRepository::new(db.pool())
        .list_by_creator(user_id)
        .await?;
    let folders_deleted = folders.len();
    for folder in folders {
        let outcome = folder_service.delete(folder.id).await?;
        files_deleted += outcome.files_deleted;
        storage_warnings.extend(outcome.storage_warnings);
    }

    // Uploads into other users' folders and confidential uploads.
    let files = FileRepository::new(db.pool())
        .list_by_uploader(user_id)
        .await?;
    for file in files {
        let outcome = file_service.delete_record(file).await?;
        files_deleted += 1;
        storage_warnings.extend(outcome.storage_warning);
    }

    if let Some(picture) = ProfileRepository::new(db.pool())
        .get_by_user(user_id)
        .await?
        .and_then(|p| p.profile_picture)
    {
        storage_warnings.extend(file_service.discard_blob(&picture).await);
    }

    UserRepository::new(db.pool()).delete(user_id).await?;
    info!(
        user_id,
        folders_deleted,
        files_deleted,
        storage_failures = storage_warnings.len(),
        "Account deleted"
    );

    Ok(AccountDeleteOutcome {
        user,
        folders_deleted,
        files_deleted,
        storage_warnings,
    })
}
