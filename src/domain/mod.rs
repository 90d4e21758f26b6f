// src/domain/mod.rs
//! Pure application-tracking logic. Nothing in here touches the database,
//! the network or the clock: callers pass `today` explicitly.

pub mod application;
pub mod dates;
pub mod error;
pub mod filters;
pub mod interview;
pub mod month;
pub mod reminders;
pub mod stats;

pub use application::{
    validate_salary_range, Application, ApplicationStatus, CreateApplicationInput, JobSource,
    JobType, QuickAddInput, SalaryCurrency, UpdateApplicationInput, QUICK_ADD_LOCATION,
};
pub use error::DomainError;
pub use filters::{apply_filters, FilterCriteria};
pub use interview::{days_until_interview, is_interview_soon, is_interview_today};
pub use month::{current_month, filter_by_month, month_range};
pub use reminders::{interviews_today, needs_follow_up, weekly_summary, WeeklySummary};
pub use stats::Stats;

/// Today's date in UTC, the reference day for every date rule.
pub fn today_utc() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
