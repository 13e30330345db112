//! Folder types and repository.

use crate::db::DbPool;
use crate::{Result, VaultError};

/// A named folder owned by the user who created it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Creator's user ID.
    pub created_by: i64,
    /// When the folder was created.
    pub created_at: String,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    pub name: String,
    pub created_by: i64,
}

impl NewFolder {
    /// Create a new folder definition.
    pub fn new(name: impl Into<String>, created_by: i64) -> Self {
        Self {
            name: name.into(),
            created_by,
        }
    }
}

/// Repository for folder rows.
pub struct FolderRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a folder.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let result = sqlx::query("INSERT INTO folders (name, created_by) VALUES (?, ?)")
            .bind(&folder.name)
            .bind(folder.created_by)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, name, created_by, created_at FROM folders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// List every folder, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, created_by, created_at FROM folders ORDER BY created_at, id",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Folders created by a user, oldest first.
    pub async fn list_by_creator(&self, user_id: i64) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, created_by, created_at FROM folders WHERE created_by = ? ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Change a folder's name. Returns None if the folder does not exist.
    pub async fn rename(&self, id: i64, name: &str) -> Result<Option<Folder>> {
        let result = sqlx::query("UPDATE folders SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a folder row.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("owner", "hash"))
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_folder() {
        let (db, owner) = setup_db().await;
        let repo = FolderRepository::new(db.pool());

        let folder = repo.create(&NewFolder::new("契約書", owner)).await.unwrap();

        assert_eq!(folder.name, "契約書");
        assert_eq!(folder.created_by, owner);
        assert!(crate::datetime::parse_utc(&folder.created_at).is_some());
    }

    #[tokio::test]
    async fn test_create_folder_with_unknown_creator_fails() {
        let (db, _) = setup_db().await;
        let repo = FolderRepository::new(db.pool());

        let result = repo.create(&NewFolder::new("Orphan", 999)).await;
        assert!(matches!(result, Err(VaultError::Database(_))));
    }

    #[tokio::test]
    async fn test_get_folder_not_found() {
        let (db, _) = setup_db().await;
        let repo = FolderRepository::new(db.pool());

        assert!(repo.get_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_in_creation_order() {
        let (db, owner) = setup_db().await;
        let repo = FolderRepository::new(db.pool());

        repo.create(&NewFolder::new("First", owner)).await.unwrap();
        repo.create(&NewFolder::new("Second", owner)).await.unwrap();

        let folders = repo.list_all().await.unwrap();
        let names: Vec<_> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_list_by_creator() {
        let (db, owner) = setup_db().await;
        let other = UserRepository::new(db.pool())
            .create(&NewUser::new("other", "hash"))
            .await
            .unwrap();
        let repo = FolderRepository::new(db.pool());

        repo.create(&NewFolder::new("Mine", owner)).await.unwrap();
        repo.create(&NewFolder::new("Theirs", other.id)).await.unwrap();

        let folders = repo.list_by_creator(owner).await.unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name, "Mine");
    }

    #[tokio::test]
    async fn test_rename_folder() {
        let (db, owner) = setup_db().await;
        let repo = FolderRepository::new(db.pool());
        let folder = repo.create(&NewFolder::new("Draft", owner)).await.unwrap();

        let renamed = repo.rename(folder.id, "Final").await.unwrap().unwrap();
        assert_eq!(renamed.name, "Final");
        assert_eq!(renamed.created_at, folder.created_at);

        assert!(repo.rename(9999, "Nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_folder() {
        let (db, owner) = setup_db().await;
        let repo = FolderRepository::new(db.pool());
        let folder = repo.create(&NewFolder::new("Temp", owner)).await.unwrap();

        assert!(repo.delete(folder.id).await.unwrap());
        assert!(!repo.delete(folder.id).await.unwrap());
        assert!(repo.get_by_id(folder.id).await.unwrap().is_none());
    }
}
