// src/domain/interview.rs
//! Interview date checks. All comparisons are on calendar days.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Window, in days, that counts as "soon".
pub const SOON_WINDOW_DAYS: i64 = 7;

pub fn is_interview_today(interview: Option<NaiveDateTime>, today: NaiveDate) -> bool {
    interview.is_some_and(|dt| dt.date() == today)
}

/// True for interviews from today up to and including `today + 7`.
pub fn is_interview_soon(interview: Option<NaiveDateTime>, today: NaiveDate) -> bool {
    let horizon = today + Duration::days(SOON_WINDOW_DAYS);
    interview.is_some_and(|dt| {
        let day = dt.date();
        day >= today && day <= horizon
    })
}

/// Whole days from `today` to the interview; negative once it has passed.
pub fn days_until_interview(interview: Option<NaiveDateTime>, today: NaiveDate) -> Option<i64> {
    interview.map(|dt| (dt.date() - today).num_days())
}
