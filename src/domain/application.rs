// src/domain/application.rs
//! Application records and their input payloads.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::dates;
use super::DomainError;

/// Location used by quick-add until the user fills in the details.
pub const QUICK_ADD_LOCATION: &str = "To be specified";

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $wire:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($wire $(| $alias)* => Ok($name::$variant),)+
                    other => Err(DomainError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "full-time")]
    FullTime,
    #[serde(rename = "part-time")]
    PartTime,
    #[serde(rename = "contract")]
    Contract,
    #[serde(rename = "freelance")]
    Freelance,
}

string_enum!(JobType, "job type", {
    FullTime => "full-time",
    PartTime => "part-time",
    Contract => "contract",
    Freelance => "freelance",
});

impl JobType {
    pub fn label(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Freelance => "Freelance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
}

string_enum!(ApplicationStatus, "status", {
    Applied => "applied",
    Interview => "interview",
    Offer => "offer",
    Rejected => "rejected",
});

impl ApplicationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobSource {
    LinkedIn,
    Indeed,
    Glassdoor,
    Email,
    Referral,
    #[serde(alias = "Otro")]
    Other,
}

string_enum!(JobSource, "source", {
    LinkedIn => "LinkedIn",
    Indeed => "Indeed",
    Glassdoor => "Glassdoor",
    Email => "Email",
    Referral => "Referral",
    Other => "Other" | "Otro",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SalaryCurrency {
    #[default]
    Usd,
    Ars,
    Eur,
}

string_enum!(SalaryCurrency, "currency", {
    Usd => "USD",
    Ars => "ARS",
    Eur => "EUR",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub user_id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<SalaryCurrency>,
    pub status: ApplicationStatus,
    pub date_applied: NaiveDate,
    pub response_received: bool,
    pub interview_date: Option<NaiveDateTime>,
    pub source: JobSource,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub link: Option<String>,
    pub cv_id: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationInput {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub salary_currency: Option<SalaryCurrency>,
    pub status: ApplicationStatus,
    #[serde(deserialize_with = "dates::lenient_date")]
    pub date_applied: NaiveDate,
    #[serde(default)]
    pub response_received: Option<bool>,
    #[serde(default, deserialize_with = "dates::lenient_datetime_opt")]
    pub interview_date: Option<NaiveDateTime>,
    pub source: JobSource,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub cv_id: Option<String>,
}

impl CreateApplicationInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.job_title.trim().is_empty() {
            return Err(DomainError::MissingField("job_title"));
        }
        if self.company.trim().is_empty() {
            return Err(DomainError::MissingField("company"));
        }
        if self.location.trim().is_empty() {
            return Err(DomainError::MissingField("location"));
        }
        validate_salary_range(self.salary_min, self.salary_max)
    }

    /// Materialise a new record owned by `user_id`.
    pub fn into_application(self, user_id: &str, now: DateTime<Utc>) -> Application {
        Application {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            job_title: self.job_title.trim().to_string(),
            company: self.company.trim().to_string(),
            location: self.location.trim().to_string(),
            job_type: self.job_type,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            salary_currency: self.salary_currency,
            status: self.status,
            date_applied: self.date_applied,
            response_received: self.response_received.unwrap_or(false),
            interview_date: self.interview_date,
            source: self.source,
            notes: non_blank(self.notes),
            tags: self.tags.unwrap_or_default(),
            link: non_blank(self.link),
            cv_id: non_blank(self.cv_id),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The three-field form: everything else takes the quick-add defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct QuickAddInput {
    pub company: String,
    pub job_title: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl QuickAddInput {
    pub fn into_create_input(self, today: NaiveDate) -> CreateApplicationInput {
        CreateApplicationInput {
            job_title: self.job_title,
            company: self.company,
            location: QUICK_ADD_LOCATION.to_string(),
            job_type: JobType::FullTime,
            salary_min: None,
            salary_max: None,
            salary_currency: None,
            status: ApplicationStatus::Applied,
            date_applied: today,
            response_received: Some(false),
            interview_date: None,
            source: JobSource::LinkedIn,
            notes: None,
            tags: Some(Vec::new()),
            link: self.link,
            cv_id: None,
        }
    }
}

/// Partial update. `Some(None)` on a nullable field clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationInput {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary_min: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary_max: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary_currency: Option<Option<SalaryCurrency>>,
    pub status: Option<ApplicationStatus>,
    #[serde(default, deserialize_with = "dates::lenient_date_opt")]
    pub date_applied: Option<NaiveDate>,
    pub response_received: Option<bool>,
    #[serde(default, deserialize_with = "interview_patch")]
    pub interview_date: Option<Option<NaiveDateTime>>,
    pub source: Option<JobSource>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cv_id: Option<Option<String>>,
    pub is_favorite: Option<bool>,
}

impl UpdateApplicationInput {
    /// Apply the patch onto `app`, validating the result.
    pub fn apply_to(self, app: &mut Application, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(title) = self.job_title {
            app.job_title = required(title, "job_title")?;
        }
        if let Some(company) = self.company {
            app.company = required(company, "company")?;
        }
        if let Some(location) = self.location {
            app.location = required(location, "location")?;
        }
        if let Some(job_type) = self.job_type {
            app.job_type = job_type;
        }
        if let Some(salary_min) = self.salary_min {
            app.salary_min = salary_min;
        }
        if let Some(salary_max) = self.salary_max {
            app.salary_max = salary_max;
        }
        if let Some(currency) = self.salary_currency {
            app.salary_currency = currency;
        }
        if let Some(status) = self.status {
            app.status = status;
        }
        if let Some(date_applied) = self.date_applied {
            app.date_applied = date_applied;
        }
        if let Some(response_received) = self.response_received {
            app.response_received = response_received;
        }
        if let Some(interview_date) = self.interview_date {
            app.interview_date = interview_date;
        }
        if let Some(source) = self.source {
            app.source = source;
        }
        if let Some(notes) = self.notes {
            app.notes = non_blank(notes);
        }
        if let Some(tags) = self.tags {
            app.tags = tags;
        }
        if let Some(link) = self.link {
            app.link = non_blank(link);
        }
        if let Some(cv_id) = self.cv_id {
            app.cv_id = non_blank(cv_id);
        }
        if let Some(is_favorite) = self.is_favorite {
            app.is_favorite = is_favorite;
        }

        validate_salary_range(app.salary_min, app.salary_max)?;
        app.updated_at = now;
        Ok(())
    }

    pub fn cv_id_to_check(&self) -> Option<&str> {
        match &self.cv_id {
            Some(Some(id)) if !id.trim().is_empty() => Some(id.as_str()),
            _ => None,
        }
    }
}

pub fn validate_salary_range(min: Option<i64>, max: Option<i64>) -> Result<(), DomainError> {
    if min.is_some_and(|v| v < 0) {
        return Err(DomainError::NegativeSalary { field: "salary_min" });
    }
    if max.is_some_and(|v| v < 0) {
        return Err(DomainError::NegativeSalary { field: "salary_max" });
    }
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(DomainError::InvalidSalaryRange { min, max }),
        _ => Ok(()),
    }
}

fn required(value: String, field: &'static str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DomainError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn interview_patch<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDateTime>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    dates::lenient_datetime_opt(deserializer).map(Some)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal applied record for tests; tweak fields as needed.
    pub fn application(company: &str, status: ApplicationStatus, date_applied: &str) -> Application {
        let now = Utc::now();
        Application {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "user-1".to_string(),
            job_title: "Backend Engineer".to_string(),
            company: company.to_string(),
            location: "Buenos Aires, AR".to_string(),
            job_type: JobType::FullTime,
            salary_min: None,
            salary_max: None,
            salary_currency: None,
            status,
            date_applied: dates::parse_date(date_applied).unwrap(),
            response_received: false,
            interview_date: None,
            source: JobSource::LinkedIn,
            notes: None,
            tags: Vec::new(),
            link: None,
            cv_id: None,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }
}
