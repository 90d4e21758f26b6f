// src/export/csv_export.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::format;
use crate::domain::{Application, DomainError};

const HEADERS: [&str; 11] = [
    "Company",
    "Job Title",
    "Location",
    "Type",
    "Status",
    "Date Applied",
    "Source",
    "Salary (Range)",
    "Response Received",
    "Interview Date",
    "Notes",
];

/// Serialize records to CSV bytes. An empty list is `DomainError::NothingToExport`.
pub fn to_csv(records: &[Application]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Err(DomainError::NothingToExport.into());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for app in records {
        writer.write_record([
            app.company.as_str(),
            app.job_title.as_str(),
            app.location.as_str(),
            app.job_type.label(),
            app.status.label(),
            format::date(app.date_applied).as_str(),
            app.source.as_str(),
            format::salary_range(app).as_str(),
            format::yes_no(app.response_received),
            format::interview(app.interview_date).as_str(),
            app.notes.as_deref().unwrap_or(""),
        ])?;
    }

    writer.into_inner().context("Failed to flush CSV writer")
}

pub fn csv_file_name(today: NaiveDate) -> String {
    format::dated_file_name("applications", today, "csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::fixtures::application;
    use crate::domain::ApplicationStatus;

    #[test]
    fn test_csv_rows_and_quoting() {
        let mut app = application("Acme, Inc.", ApplicationStatus::Interview, "2025-01-05");
        app.notes = Some("said \"call me\"".to_string());
        app.salary_min = Some(1000);
        app.interview_date = NaiveDate::from_ymd_opt(2025, 1, 9)
            .unwrap()
            .and_hms_opt(14, 30, 0);

        let bytes = to_csv(&[app]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Company,Job Title,Location"));
        assert!(lines[1].starts_with("\"Acme, Inc.\",Backend Engineer"));
        assert!(lines[1].contains("1000+ USD"));
        assert!(lines[1].contains("2025-01-09 14:30"));
        assert!(lines[1].ends_with("\"said \"\"call me\"\"\""));
    }

    #[test]
    fn test_empty_export_is_rejected() {
        let err = to_csv(&[]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::NothingToExport)
        );
    }
}
