// src/export/format.rs
//! Cell formatting shared by the CSV and PDF exports.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{Application, SalaryCurrency};

pub fn salary_range(app: &Application) -> String {
    let currency = app.salary_currency.unwrap_or_default();
    format_salary(app.salary_min, app.salary_max, currency)
}

pub fn format_salary(min: Option<i64>, max: Option<i64>, currency: SalaryCurrency) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{}-{} {}", min, max, currency),
        (Some(min), None) => format!("{}+ {}", min, currency),
        (None, Some(max)) => format!("Up to {} {}", max, currency),
        (None, None) => "-".to_string(),
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn interview(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `<prefix>_YYYY-MM-DD.<ext>`
pub fn dated_file_name(prefix: &str, today: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", prefix, date(today), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_range_variants() {
        assert_eq!(
            format_salary(Some(50000), Some(70000), SalaryCurrency::Usd),
            "50000-70000 USD"
        );
        assert_eq!(format_salary(Some(800000), None, SalaryCurrency::Ars), "800000+ ARS");
        assert_eq!(format_salary(None, Some(4000), SalaryCurrency::Eur), "Up to 4000 EUR");
        assert_eq!(format_salary(None, None, SalaryCurrency::Usd), "-");
    }

    #[test]
    fn test_dated_file_name() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(dated_file_name("applications", today, "csv"), "applications_2025-01-05.csv");
    }
}
