//! Audit and system log repository.

use serde::Serialize;

use crate::db::DbPool;
use crate::{Result, VaultError};

/// A client-supplied audit record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditLog {
    pub id: i64,
    pub info1: Option<String>,
    pub info2: Option<String>,
    pub info3: Option<String>,
    pub info4: Option<String>,
    /// Set by the database at insert time.
    pub log_date: String,
}

/// Fields for a new audit record.
#[derive(Debug, Clone, Default)]
pub struct NewAuditLog {
    pub info1: Option<String>,
    pub info2: Option<String>,
    pub info3: Option<String>,
    pub info4: Option<String>,
}

impl NewAuditLog {
    /// Whether every field is absent or blank.
    pub fn is_empty(&self) -> bool {
        [&self.info1, &self.info2, &self.info3, &self.info4]
            .iter()
            .all(|f| f.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// A server-generated record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SystemLog {
    pub id: i64,
    pub detail: String,
    pub detail_two: Option<String>,
    pub log_date: String,
}

/// Repository for both log tables.
pub struct LogRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> LogRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Append an audit record.
    pub async fn create_audit(&self, entry: &NewAuditLog) -> Result<AuditLog> {
        let log = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (info1, info2, info3, info4)
            VALUES ($1, $2, $3, $4)
            RETURNING id, info1, info2, info3, info4, log_date
            "#,
        )
        .bind(&entry.info1)
        .bind(&entry.info2)
        .bind(&entry.info3)
        .bind(&entry.info4)
        .fetch_one(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(log)
    }

    /// All audit records, newest first.
    pub async fn list_audit(&self) -> Result<Vec<AuditLog>> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, info1, info2, info3, info4, log_date
            FROM audit_logs
            ORDER BY log_date DESC, id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(logs)
    }

    /// Append a system record.
    pub async fn create_system(&self, detail: &str, detail_two: Option<&str>) -> Result<SystemLog> {
        let log = sqlx::query_as::<_, SystemLog>(
            r#"
            INSERT INTO system_logs (detail, detail_two)
            VALUES ($1, $2)
            RETURNING id, detail, detail_two, log_date
            "#,
        )
        .bind(detail)
        .bind(detail_two)
        .fetch_one(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(log)
    }

    /// All system records, newest first.
    pub async fn list_system(&self) -> Result<Vec<SystemLog>> {
        let logs = sqlx::query_as::<_, SystemLog>(
            r#"
            SELECT id, detail, detail_two, log_date
            FROM system_logs
            ORDER BY log_date DESC, id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_create_audit_sets_log_date() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LogRepository::new(db.pool());

        let log = repo
            .create_audit(&NewAuditLog {
                info1: Some("login".to_string()),
                info2: Some("alice".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(log.info1.as_deref(), Some("login"));
        assert_eq!(log.info2.as_deref(), Some("alice"));
        assert!(log.info3.is_none());
        assert!(!log.log_date.is_empty());
    }

    #[tokio::test]
    async fn test_list_audit_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LogRepository::new(db.pool());

        for name in ["first", "second", "third"] {
            repo.create_audit(&NewAuditLog {
                info1: Some(name.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let logs = repo.list_audit().await.unwrap();
        let names: Vec<_> = logs.iter().filter_map(|l| l.info1.as_deref()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_system_logs() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LogRepository::new(db.pool());

        repo.create_system("blob delete failed", Some("ab.pdf"))
            .await
            .unwrap();
        repo.create_system("startup", None).await.unwrap();

        let logs = repo.list_system().await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].detail, "startup");
        assert_eq!(logs[1].detail_two.as_deref(), Some("ab.pdf"));

        assert!(repo.list_audit().await.unwrap().is_empty());
    }

    #[test]
    fn test_new_audit_log_is_empty() {
        assert!(NewAuditLog::default().is_empty());
        assert!(NewAuditLog {
            info2: Some("  ".to_string()),
            ..Default::default()
        }
        .is_empty());
        assert!(!NewAuditLog {
            info4: Some("x".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
