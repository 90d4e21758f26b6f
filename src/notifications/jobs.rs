// src/notifications/jobs.rs
//! The three scheduled reminder jobs.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::fmt;

use super::{compose, EmailContext, EmailType, Mailer};
use crate::app_log;
use crate::domain::{interviews_today, reminders, weekly_summary, Application};
use crate::repository::{ApplicationRepository, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationJob {
    /// Daily 09:00 UTC: interviews happening today
    CheckInterviews,
    /// Monday 08:00 UTC: applications without an answer after a week
    CheckNoResponse,
    /// Friday 17:00 UTC: one summary per user
    WeeklySummary,
}

impl NotificationJob {
    pub const ALL: [NotificationJob; 3] = [
        NotificationJob::CheckInterviews,
        NotificationJob::CheckNoResponse,
        NotificationJob::WeeklySummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationJob::CheckInterviews => "check-interviews",
            NotificationJob::CheckNoResponse => "check-no-response",
            NotificationJob::WeeklySummary => "weekly-summary",
        }
    }
}

impl fmt::Display for NotificationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JobReport {
    pub job: NotificationJob,
    pub users_scanned: usize,
    pub emails_sent: usize,
    pub failures: usize,
}

impl JobReport {
    fn new(job: NotificationJob) -> Self {
        Self {
            job,
            users_scanned: 0,
            emails_sent: 0,
            failures: 0,
        }
    }

    async fn deliver(&mut self, mailer: &dyn Mailer, email_type: EmailType, to: &str, ctx: &EmailContext) {
        let message = compose(email_type, to, ctx);
        match mailer.send(&message).await {
            Ok(_) => self.emails_sent += 1,
            Err(e) => {
                self.failures += 1;
                app_log!(error, "Failed to send {} email to {}: {:#}", email_type, to, e);
            }
        }
    }
}

/// Scan every user's applications and send the emails `job` calls for.
pub async fn run_job(
    job: NotificationJob,
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    today: NaiveDate,
) -> Result<JobReport> {
    let grouped = ApplicationRepository::new(pool).list_grouped_by_user().await?;
    let emails: HashMap<String, String> = UserRepository::new(pool)
        .list()
        .await?
        .into_iter()
        .map(|u| (u.id, u.email))
        .collect();

    app_log!(info, "Running {} for {} users", job, grouped.len());
    let mut report = JobReport::new(job);

    for (user_id, applications) in &grouped {
        let Some(email) = emails.get(user_id) else {
            app_log!(warn, "Skipping applications of unknown user {}", user_id);
            continue;
        };
        report.users_scanned += 1;
        run_for_user(job, &mut report, mailer, email, applications, today).await;
    }

    app_log!(
        info,
        "{} finished: {} users, {} emails sent, {} failures",
        job,
        report.users_scanned,
        report.emails_sent,
        report.failures
    );
    Ok(report)
}

async fn run_for_user(
    job: NotificationJob,
    report: &mut JobReport,
    mailer: &dyn Mailer,
    email: &str,
    applications: &[Application],
    today: NaiveDate,
) {
    match job {
        NotificationJob::CheckInterviews => {
            for app in interviews_today(applications, today) {
                let ctx = EmailContext::for_application(app);
                report.deliver(mailer, EmailType::Interview24h, email, &ctx).await;
            }
        }
        NotificationJob::CheckNoResponse => {
            for app in reminders::stale_applications(applications, today) {
                let ctx = EmailContext::for_application(app);
                report.deliver(mailer, EmailType::NoResponse7d, email, &ctx).await;
            }
        }
        NotificationJob::WeeklySummary => {
            let ctx = EmailContext::for_summary(weekly_summary(applications, today));
            report.deliver(mailer, EmailType::WeeklySummary, email, &ctx).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::domain::application::fixtures::application;
    use crate::domain::ApplicationStatus;
    use crate::notifications::MemoryMailer;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed(db: &Database, email: &str, apps: Vec<Application>) {
        let user = UserRepository::new(db.pool())
            .create(email, "User", "hash")
            .await
            .unwrap();
        let repo = ApplicationRepository::new(db.pool());
        for mut app in apps {
            app.user_id = user.id.clone();
            repo.insert(&app).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_check_interviews_sends_one_per_hit() {
        let db = Database::in_memory().await.unwrap();
        let today = ymd(2025, 1, 13);

        let mut today_a = application("Acme", ApplicationStatus::Interview, "2025-01-02");
        today_a.interview_date = today.and_hms_opt(10, 0, 0);
        let mut today_b = application("Globex", ApplicationStatus::Interview, "2025-01-03");
        today_b.interview_date = today.and_hms_opt(16, 0, 0);
        let mut later = application("Initech", ApplicationStatus::Interview, "2025-01-03");
        later.interview_date = ymd(2025, 1, 20).and_hms_opt(9, 0, 0);

        seed(&db, "ana@example.com", vec![today_a, today_b, later]).await;
        seed(&db, "bob@example.com", vec![application("Hooli", ApplicationStatus::Applied, "2025-01-10")]).await;

        let mailer = MemoryMailer::new();
        let report = run_job(NotificationJob::CheckInterviews, db.pool(), &mailer, today)
            .await
            .unwrap();

        assert_eq!(report.users_scanned, 2);
        assert_eq!(report.emails_sent, 2);
        assert!(mailer.sent().iter().all(|m| m.to == "ana@example.com"));
    }

    #[tokio::test]
    async fn test_failed_send_is_counted_not_fatal() {
        let db = Database::in_memory().await.unwrap();
        let today = ymd(2025, 1, 13);
        seed(&db, "ana@example.com", vec![application("Acme", ApplicationStatus::Applied, "2025-01-01")]).await;
        seed(&db, "bob@example.com", vec![application("Globex", ApplicationStatus::Applied, "2025-01-02")]).await;

        let mailer = MemoryMailer::failing_for("ana@example.com");
        let report = run_job(NotificationJob::CheckNoResponse, db.pool(), &mailer, today)
            .await
            .unwrap();

        assert_eq!(report.failures, 1);
        assert_eq!(report.emails_sent, 1);
        assert_eq!(mailer.sent()[0].to, "bob@example.com");
    }

    #[tokio::test]
    async fn test_weekly_summary_one_per_user() {
        let db = Database::in_memory().await.unwrap();
        seed(
            &db,
            "ana@example.com",
            vec![
                application("Acme", ApplicationStatus::Offer, "2025-01-10"),
                application("Globex", ApplicationStatus::Applied, "2024-12-01"),
            ],
        )
        .await;

        let mailer = MemoryMailer::new();
        let report = run_job(NotificationJob::WeeklySummary, db.pool(), &mailer, ymd(2025, 1, 13))
            .await
            .unwrap();

        assert_eq!(report.emails_sent, 1);
        let html = &mailer.sent()[0].html;
        assert!(html.contains("Applications this week: <strong>1</strong>"));
        assert!(html.contains("Offers received: <strong>1</strong>"));
    }
}
