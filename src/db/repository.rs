//! User repository for docvault.

use sqlx::QueryBuilder;

use super::user::{NewUser, User, UserUpdate};
use super::DbPool;
use crate::{Result, VaultError};

const USER_COLUMNS: &str =
    "id, username, password, email, first_name, last_name, is_staff, is_superuser, created_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user and return it with its assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, password, email, first_name, last_name, is_staff, is_superuser)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.is_staff)
        .bind(new_user.is_superuser)
        .execute(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                VaultError::Conflict(format!("username {} is taken", new_user.username))
            }
            _ => VaultError::Database(e.to_string()),
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Get a user by ID, failing with `NotFound` when absent.
    pub async fn require(&self, id: i64) -> Result<User> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("user".to_string()))
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Check whether a username is already taken (case-insensitive).
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? COLLATE NOCASE")
                .bind(username)
                .fetch_one(self.pool)
                .await
                .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Update a user by ID.
    ///
    /// Returns the updated user, or None if not found.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }
        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }
        if let Some(ref first_name) = update.first_name {
            separated.push("first_name = ");
            separated.push_bind_unseparated(first_name);
        }
        if let Some(ref last_name) = update.last_name {
            separated.push("last_name = ");
            separated.push_bind_unseparated(last_name);
        }
        if let Some(is_staff) = update.is_staff {
            separated.push("is_staff = ");
            separated.push_bind_unseparated(is_staff);
        }
        if let Some(is_superuser) = update.is_superuser {
            separated.push("is_superuser = ");
            separated.push_bind_unseparated(is_superuser);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a user. Profile, folders, files and tokens cascade.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// List users without the staff flag, ordered by ID.
    pub async fn list_non_staff(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE is_staff = 0 ORDER BY id");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let created = repo
            .create(
                &NewUser::new("alice", "hash")
                    .with_email("alice@example.com")
                    .with_name("Alice", "Liddell"),
            )
            .await
            .unwrap();

        assert_eq!(created.username, "alice");
        assert_eq!(created.email, "alice@example.com");
        assert!(!created.is_staff);

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.first_name, "Alice");
        assert_eq!(found.last_name, "Liddell");
    }

    #[tokio::test]
    async fn test_get_by_username_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("Alice", "hash")).await.unwrap();

        assert!(repo.get_by_username("alice").await.unwrap().is_some());
        assert!(repo.username_exists("ALICE").await.unwrap());
        assert!(!repo.username_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("alice", "hash")).await.unwrap();

        let result = repo.create(&NewUser::new("ALICE", "hash")).await;
        assert!(matches!(result, Err(VaultError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_require_missing_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let result = repo.require(42).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo.create(&NewUser::new("alice", "hash")).await.unwrap();

        let updated = repo
            .update(user.id, &UserUpdate::new().is_staff(true).email("a@b.c"))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_staff);
        assert_eq!(updated.email, "a@b.c");

        let missing = repo
            .update(999, &UserUpdate::new().is_staff(true))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo.create(&NewUser::new("alice", "hash")).await.unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_non_staff() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("admin", "hash").staff())
            .await
            .unwrap();
        repo.create(&NewUser::new("alice", "hash")).await.unwrap();
        repo.create(&NewUser::new("bob", "hash")).await.unwrap();

        let users = repo.list_non_staff().await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }
}
