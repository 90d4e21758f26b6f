// src/repository/applications.rs
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::app_log;
use crate::domain::Application;

/// Raw row; enum columns and tags are stored as text.
#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: String,
    user_id: String,
    job_title: String,
    company: String,
    location: String,
    job_type: String,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
    salary_currency: Option<String>,
    status: String,
    date_applied: NaiveDate,
    response_received: bool,
    interview_date: Option<NaiveDateTime>,
    source: String,
    notes: Option<String>,
    tags: String,
    link: Option<String>,
    cv_id: Option<String>,
    is_favorite: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = anyhow::Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        let context = || format!("Corrupt application row {}", row.id);

        Ok(Application {
            job_type: row.job_type.parse().with_context(context)?,
            status: row.status.parse().with_context(context)?,
            source: row.source.parse().with_context(context)?,
            salary_currency: row
                .salary_currency
                .as_deref()
                .map(str::parse)
                .transpose()
                .with_context(context)?,
            tags: serde_json::from_str(&row.tags).with_context(context)?,
            id: row.id,
            user_id: row.user_id,
            job_title: row.job_title,
            company: row.company,
            location: row.location,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            date_applied: row.date_applied,
            response_received: row.response_received,
            interview_date: row.interview_date,
            notes: row.notes,
            link: row.link,
            cv_id: row.cv_id,
            is_favorite: row.is_favorite,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const APPLICATION_COLUMNS: &str = "id, user_id, job_title, company, location, job_type, \
    salary_min, salary_max, salary_currency, status, date_applied, response_received, \
    interview_date, source, notes, tags, link, cv_id, is_favorite, created_at, updated_at";

pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All applications of a user, most recently applied first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = ? \
             ORDER BY date_applied DESC, created_at DESC"
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Application::try_from).collect()
    }

    /// Every application in the store keyed by owner, for the scheduled jobs
    pub async fn list_grouped_by_user(&self) -> Result<BTreeMap<String, Vec<Application>>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY user_id, date_applied DESC"
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        let mut grouped: BTreeMap<String, Vec<Application>> = BTreeMap::new();
        for row in rows {
            let app = Application::try_from(row)?;
            grouped.entry(app.user_id.clone()).or_default().push(app);
        }
        Ok(grouped)
    }

    pub async fn find(&self, user_id: &str, id: &str) -> Result<Option<Application>> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = ? AND id = ?");
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Application::try_from).transpose()
    }

    pub async fn insert(&self, app: &Application) -> Result<()> {
        let sql = format!(
            "INSERT INTO applications ({APPLICATION_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&sql)
            .bind(&app.id)
            .bind(&app.user_id)
            .bind(&app.job_title)
            .bind(&app.company)
            .bind(&app.location)
            .bind(app.job_type.as_str())
            .bind(app.salary_min)
            .bind(app.salary_max)
            .bind(app.salary_currency.map(|c| c.as_str()))
            .bind(app.status.as_str())
            .bind(app.date_applied)
            .bind(app.response_received)
            .bind(app.interview_date)
            .bind(app.source.as_str())
            .bind(&app.notes)
            .bind(serde_json::to_string(&app.tags)?)
            .bind(&app.link)
            .bind(&app.cv_id)
            .bind(app.is_favorite)
            .bind(app.created_at)
            .bind(app.updated_at)
            .execute(self.pool)
            .await
            .with_context(|| format!("Failed to insert application {}", app.id))?;

        app_log!(debug, "Inserted application {} for user {}", app.id, app.user_id);
        Ok(())
    }

    /// Overwrite every mutable column of an existing record
    pub async fn update(&self, app: &Application) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE applications SET
                job_title = ?, company = ?, location = ?, job_type = ?,
                salary_min = ?, salary_max = ?, salary_currency = ?, status = ?,
                date_applied = ?, response_received = ?, interview_date = ?, source = ?,
                notes = ?, tags = ?, link = ?, cv_id = ?, is_favorite = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(&app.job_title)
        .bind(&app.company)
        .bind(&app.location)
        .bind(app.job_type.as_str())
        .bind(app.salary_min)
        .bind(app.salary_max)
        .bind(app.salary_currency.map(|c| c.as_str()))
        .bind(app.status.as_str())
        .bind(app.date_applied)
        .bind(app.response_received)
        .bind(app.interview_date)
        .bind(app.source.as_str())
        .bind(&app.notes)
        .bind(serde_json::to_string(&app.tags)?)
        .bind(&app.link)
        .bind(&app.cv_id)
        .bind(app.is_favorite)
        .bind(app.updated_at)
        .bind(&app.user_id)
        .bind(&app.id)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to update application {}", app.id))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the favourite flag, returning the updated record
    pub async fn toggle_favorite(&self, user_id: &str, id: &str) -> Result<Option<Application>> {
        let result = sqlx::query(
            "UPDATE applications SET is_favorite = NOT is_favorite, updated_at = ? \
             WHERE user_id = ? AND id = ?",
        )
        .bind(Utc::now())
        .bind(user_id)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(user_id, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::domain::application::fixtures::application;
    use crate::domain::{ApplicationStatus, SalaryCurrency};
    use crate::repository::{CvRecord, CvRepository, UserRepository};

    async fn setup() -> (Database, String) {
        let db = Database::in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create("apps@example.com", "Apps", "hash")
            .await
            .unwrap();
        (db, user.id)
    }

    fn owned(user_id: &str, company: &str, date: &str) -> Application {
        let mut app = application(company, ApplicationStatus::Applied, date);
        app.user_id = user_id.to_string();
        app
    }

    #[tokio::test]
    async fn test_insert_find_roundtrip() {
        let (db, user_id) = setup().await;
        let repo = ApplicationRepository::new(db.pool());

        let mut app = owned(&user_id, "Acme", "2025-01-05");
        app.salary_min = Some(1000);
        app.salary_currency = Some(SalaryCurrency::Ars);
        app.tags = vec!["rust".to_string(), "remote".to_string()];
        app.interview_date = NaiveDate::from_ymd_opt(2025, 1, 20)
            .unwrap()
            .and_hms_opt(15, 0, 0);
        repo.insert(&app).await.unwrap();

        let found = repo.find(&user_id, &app.id).await.unwrap().unwrap();
        assert_eq!(found.tags, app.tags);
        assert_eq!(found.salary_currency, Some(SalaryCurrency::Ars));
        assert_eq!(found.interview_date, app.interview_date);
        assert_eq!(found.date_applied, app.date_applied);

        assert!(repo.find("other-user", &app.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_order_update_delete() {
        let (db, user_id) = setup().await;
        let repo = ApplicationRepository::new(db.pool());

        let older = owned(&user_id, "Older", "2025-01-01");
        let newer = owned(&user_id, "Newer", "2025-02-01");
        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();

        let listed = repo.list_for_user(&user_id).await.unwrap();
        assert_eq!(listed[0].company, "Newer");

        let mut changed = older.clone();
        changed.status = ApplicationStatus::Offer;
        assert!(repo.update(&changed).await.unwrap());
        let found = repo.find(&user_id, &older.id).await.unwrap().unwrap();
        assert_eq!(found.status, ApplicationStatus::Offer);

        let toggled = repo.toggle_favorite(&user_id, &older.id).await.unwrap().unwrap();
        assert!(toggled.is_favorite);

        assert!(repo.delete(&user_id, &older.id).await.unwrap());
        assert!(!repo.delete(&user_id, &older.id).await.unwrap());

        let grouped = repo.list_grouped_by_user().await.unwrap();
        assert_eq!(grouped[&user_id].len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_cv_unlinks_applications() {
        let (db, user_id) = setup().await;
        let cv = CvRecord {
            id: "cv-1".to_string(),
            user_id: user_id.clone(),
            file_id: "file-1".to_string(),
            file_name: "cv.pdf".to_string(),
            size_bytes: 10,
            content_type: "application/pdf".to_string(),
            is_favorite: false,
            created_at: Utc::now(),
        };
        CvRepository::new(db.pool()).insert(&cv).await.unwrap();

        let repo = ApplicationRepository::new(db.pool());
        let mut app = owned(&user_id, "Acme", "2025-01-05");
        app.cv_id = Some(cv.id.clone());
        repo.insert(&app).await.unwrap();

        CvRepository::new(db.pool()).delete(&user_id, &cv.id).await.unwrap();
        let found = repo.find(&user_id, &app.id).await.unwrap().unwrap();
        assert_eq!(found.cv_id, None);
    }
}
