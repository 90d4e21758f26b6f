// src/domain/month.rs
//! Calendar-month selection over application records.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use super::{Application, DomainError};

/// `YYYY-MM` for the month containing `today`.
pub fn current_month(today: NaiveDate) -> String {
    format!("{:04}-{:02}", today.year(), today.month())
}

/// Inclusive bounds of a `YYYY-MM` month: first day 00:00 to last day 23:59:59.999.
pub fn month_range(month: &str) -> Result<(NaiveDateTime, NaiveDateTime), DomainError> {
    let invalid = || DomainError::InvalidMonth(month.to_string());

    let (year, month_num) = month.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month_num.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month_num: u32 = month_num.parse().map_err(|_| invalid())?;

    let first = NaiveDate::from_ymd_opt(year, month_num, 1).ok_or_else(invalid)?;
    let next_first = if month_num == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month_num + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next_first.pred_opt().ok_or_else(invalid)?;

    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).ok_or_else(invalid)?;
    Ok((first.and_time(NaiveTime::MIN), last.and_time(end_of_day)))
}

/// Records whose application date falls inside `month`, order preserved.
pub fn filter_by_month(records: &[Application], month: &str) -> Result<Vec<Application>, DomainError> {
    let (start, end) = month_range(month)?;

    Ok(records
        .iter()
        .filter(|app| {
            let applied = app.date_applied.and_time(NaiveTime::MIN);
            applied >= start && applied <= end
        })
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::fixtures::application;
    use crate::domain::ApplicationStatus;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_current_month() {
        assert_eq!(current_month(ymd(2025, 3, 9)), "2025-03");
        assert_eq!(current_month(ymd(2024, 12, 31)), "2024-12");
    }

    #[test]
    fn test_month_range_bounds() {
        let (start, end) = month_range("2024-02").unwrap();
        assert_eq!(start, ymd(2024, 2, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(end, ymd(2024, 2, 29).and_hms_milli_opt(23, 59, 59, 999).unwrap());

        let (_, end) = month_range("2025-12").unwrap();
        assert_eq!(end.date(), ymd(2025, 12, 31));
    }

    #[test]
    fn test_month_range_rejects_garbage() {
        for bad in ["2025", "2025-13", "2025-1", "25-01", "abcd-ef", ""] {
            assert_eq!(
                month_range(bad),
                Err(DomainError::InvalidMonth(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_filter_by_month_is_exact_subset() {
        let records = vec![
            application("Before", ApplicationStatus::Applied, "2024-12-31"),
            application("First", ApplicationStatus::Applied, "2025-01-01"),
            application("Mid", ApplicationStatus::Offer, "2025-01-15"),
            application("Last", ApplicationStatus::Rejected, "2025-01-31"),
            application("After", ApplicationStatus::Applied, "2025-02-01"),
        ];

        let january = filter_by_month(&records, "2025-01").unwrap();
        let companies: Vec<_> = january.iter().map(|a| a.company.as_str()).collect();
        assert_eq!(companies, vec!["First", "Mid", "Last"]);

        assert!(filter_by_month(&records, "2023-06").unwrap().is_empty());
    }
}
