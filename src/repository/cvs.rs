// src/repository/cvs.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::app_log;

/// Metadata for an uploaded CV. The bytes live in `CvStorage` under `file_id`.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CvRecord {
    pub id: String,
    pub user_id: String,
    pub file_id: String,
    pub file_name: String,
    pub size_bytes: i64,
    pub content_type: String,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

const CV_COLUMNS: &str =
    "id, user_id, file_id, file_name, size_bytes, content_type, is_favorite, created_at";

pub struct CvRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CvRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<CvRecord>> {
        let sql = format!(
            "SELECT {CV_COLUMNS} FROM cvs WHERE user_id = ? ORDER BY created_at DESC"
        );
        let cvs = sqlx::query_as::<_, CvRecord>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(cvs)
    }

    pub async fn find(&self, user_id: &str, id: &str) -> Result<Option<CvRecord>> {
        let sql = format!("SELECT {CV_COLUMNS} FROM cvs WHERE user_id = ? AND id = ?");
        let cv = sqlx::query_as::<_, CvRecord>(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(cv)
    }

    pub async fn favorite(&self, user_id: &str) -> Result<Option<CvRecord>> {
        let sql = format!(
            "SELECT {CV_COLUMNS} FROM cvs WHERE user_id = ? AND is_favorite = TRUE LIMIT 1"
        );
        let cv = sqlx::query_as::<_, CvRecord>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(cv)
    }

    pub async fn insert(&self, cv: &CvRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cvs (id, user_id, file_id, file_name, size_bytes, content_type, is_favorite, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&cv.id)
        .bind(&cv.user_id)
        .bind(&cv.file_id)
        .bind(&cv.file_name)
        .bind(cv.size_bytes)
        .bind(&cv.content_type)
        .bind(cv.is_favorite)
        .bind(cv.created_at)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to insert CV {}", cv.id))?;

        app_log!(info, "Stored CV {} for user {}", cv.id, cv.user_id);
        Ok(())
    }

    /// Returns false when the CV does not exist for this user.
    pub async fn rename(&self, user_id: &str, id: &str, file_name: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE cvs SET file_name = ? WHERE user_id = ? AND id = ?")
            .bind(file_name)
            .bind(user_id)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark one CV as favourite and clear the flag on every other CV of the user.
    pub async fn set_favorite(&self, user_id: &str, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM cvs WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            return Ok(false);
        }

        sqlx::query("UPDATE cvs SET is_favorite = (id = ?) WHERE user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete the reference and unlink it from applications. Returns the removed record.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<Option<CvRecord>> {
        let Some(cv) = self.find(user_id, id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE applications SET cv_id = NULL WHERE user_id = ? AND cv_id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cvs WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        app_log!(info, "Deleted CV {} for user {}", id, user_id);
        Ok(Some(cv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::repository::UserRepository;

    fn cv(user_id: &str, name: &str) -> CvRecord {
        CvRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            file_id: uuid::Uuid::new_v4().to_string(),
            file_name: name.to_string(),
            size_bytes: 1024,
            content_type: "application/pdf".to_string(),
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_single_favorite_per_user() {
        let db = Database::in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create("cv@example.com", "Cv", "hash")
            .await
            .unwrap();
        let repo = CvRepository::new(db.pool());

        let first = cv(&user.id, "first.pdf");
        let second = cv(&user.id, "second.pdf");
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        assert!(repo.set_favorite(&user.id, &first.id).await.unwrap());
        assert!(repo.set_favorite(&user.id, &second.id).await.unwrap());

        let favorites: Vec<_> = repo
            .list_for_user(&user.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.is_favorite)
            .collect();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, second.id);
        assert_eq!(repo.favorite(&user.id).await.unwrap().unwrap().id, second.id);

        assert!(!repo.set_favorite("someone-else", &first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let db = Database::in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create("cv2@example.com", "Cv", "hash")
            .await
            .unwrap();
        let repo = CvRepository::new(db.pool());
        let record = cv(&user.id, "old.pdf");
        repo.insert(&record).await.unwrap();

        assert!(repo.rename(&user.id, &record.id, "new.pdf").await.unwrap());
        let renamed = repo.find(&user.id, &record.id).await.unwrap().unwrap();
        assert_eq!(renamed.file_name, "new.pdf");
        assert_eq!(renamed.file_id, record.file_id);

        assert!(repo.delete(&user.id, &record.id).await.unwrap().is_some());
        assert!(repo.find(&user.id, &record.id).await.unwrap().is_none());
        assert!(repo.delete(&user.id, &record.id).await.unwrap().is_none());
    }
}
