// src/repository/users.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::app_log;
use crate::domain::DomainError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, email_verified, created_at
            FROM users
            WHERE email = ? COLLATE NOCASE
            "#,
        )
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, email_verified, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user with an already hashed password
    pub async fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            name: name.trim().to_string(),
            password_hash: password_hash.to_string(),
            email_verified: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, email_verified, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.email_verified)
        .bind(user.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                anyhow::Error::new(DomainError::EmailTaken)
            }
            other => anyhow::Error::new(other).context(format!("Failed to create user {}", user.email)),
        })?;

        app_log!(info, "Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// List all users, oldest first
    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, email_verified, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let created = repo.create(" Ana@Example.com ", "Ana", "hash").await.unwrap();
        assert_eq!(created.email, "ana@example.com");

        let found = repo.find_by_email("ANA@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_id("missing").await.unwrap().is_none());

        let err = repo.create("ana@example.com", "Again", "hash").await.unwrap_err();
        assert_eq!(err.downcast_ref::<DomainError>(), Some(&DomainError::EmailTaken));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
