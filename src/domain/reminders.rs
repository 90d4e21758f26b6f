// src/domain/reminders.rs
//! Predicates behind the scheduled reminder emails.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::interview::is_interview_today;
use super::{Application, ApplicationStatus};

/// Days without a response before an application is considered stale.
pub const FOLLOW_UP_AFTER_DAYS: i64 = 7;

/// Look-back window for the weekly summary.
pub const WEEK_DAYS: i64 = 7;

pub fn needs_follow_up(app: &Application, today: NaiveDate) -> bool {
    !app.response_received
        && app.status == ApplicationStatus::Applied
        && app.date_applied <= today - Duration::days(FOLLOW_UP_AFTER_DAYS)
}

pub fn stale_applications(records: &[Application], today: NaiveDate) -> Vec<&Application> {
    records.iter().filter(|app| needs_follow_up(app, today)).collect()
}

/// Records in interview status whose interview falls on `today`.
pub fn interviews_today(records: &[Application], today: NaiveDate) -> Vec<&Application> {
    records
        .iter()
        .filter(|app| {
            app.status == ApplicationStatus::Interview && is_interview_today(app.interview_date, today)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeeklySummary {
    pub total_applied: usize,
    pub total_interviews: usize,
    pub total_offers: usize,
    pub this_week: usize,
}

pub fn weekly_summary(records: &[Application], today: NaiveDate) -> WeeklySummary {
    let week_start = today - Duration::days(WEEK_DAYS);

    records.iter().fold(WeeklySummary::default(), |mut acc, app| {
        acc.total_applied += 1;
        match app.status {
            ApplicationStatus::Interview => acc.total_interviews += 1,
            ApplicationStatus::Offer => acc.total_offers += 1,
            _ => {}
        }
        if app.date_applied >= week_start {
            acc.this_week += 1;
        }
        acc
    })
}
