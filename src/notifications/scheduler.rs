// src/notifications/scheduler.rs
//! In-process replacement for the external cron: one tokio task per job.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use sqlx::SqlitePool;
use std::sync::Arc;

use super::{run_job, Mailer, NotificationJob};
use crate::app_log;

/// A UTC wall-clock slot, optionally pinned to a weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub weekday: Option<Weekday>,
    pub hour: u32,
    pub minute: u32,
}

impl Schedule {
    pub fn for_job(job: NotificationJob) -> Self {
        match job {
            NotificationJob::CheckInterviews => Schedule {
                weekday: None,
                hour: 9,
                minute: 0,
            },
            NotificationJob::CheckNoResponse => Schedule {
                weekday: Some(Weekday::Mon),
                hour: 8,
                minute: 0,
            },
            NotificationJob::WeeklySummary => Schedule {
                weekday: Some(Weekday::Fri),
                hour: 17,
                minute: 0,
            },
        }
    }

    /// First matching instant strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN);
        let today = now.date_naive();

        (0..=7)
            .map(|offset| today + Duration::days(offset))
            .filter(|day| self.weekday.map_or(true, |wd| day.weekday() == wd))
            .map(|day| day.and_time(time).and_utc())
            .find(|candidate| *candidate > now)
            .unwrap_or_else(|| (today + Duration::days(7)).and_time(time).and_utc())
    }
}

/// Spawn one background loop per job. Failures are logged and the loop keeps going.
pub fn spawn_scheduler(pool: SqlitePool, mailer: Arc<dyn Mailer>) {
    for job in NotificationJob::ALL {
        let pool = pool.clone();
        let mailer = mailer.clone();
        let schedule = Schedule::for_job(job);

        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = schedule.next_after(now);
                app_log!(info, "Next {} run at {}", job, next);

                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                let today = Utc::now().date_naive();
                if let Err(e) = run_job(job, &pool, mailer.as_ref(), today).await {
                    app_log!(error, "Scheduled {} failed: {:#}", job, e);
                }
            }
        });
    }

    app_log!(info, "Notification scheduler started");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_daily_schedule() {
        let daily = Schedule::for_job(NotificationJob::CheckInterviews);
        // 2025-01-13 is a Monday
        assert_eq!(daily.next_after(at(2025, 1, 13, 8, 59)), at(2025, 1, 13, 9, 0));
        assert_eq!(daily.next_after(at(2025, 1, 13, 9, 0)), at(2025, 1, 14, 9, 0));
        assert_eq!(daily.next_after(at(2025, 12, 31, 23, 0)), at(2026, 1, 1, 9, 0));
    }

    #[test]
    fn test_weekly_schedules() {
        let monday = Schedule::for_job(NotificationJob::CheckNoResponse);
        assert_eq!(monday.next_after(at(2025, 1, 13, 7, 0)), at(2025, 1, 13, 8, 0));
        assert_eq!(monday.next_after(at(2025, 1, 13, 8, 0)), at(2025, 1, 20, 8, 0));

        let friday = Schedule::for_job(NotificationJob::WeeklySummary);
        assert_eq!(friday.next_after(at(2025, 1, 13, 12, 0)), at(2025, 1, 17, 17, 0));
        assert_eq!(friday.next_after(at(2025, 1, 17, 18, 0)), at(2025, 1, 24, 17, 0));
    }
}
