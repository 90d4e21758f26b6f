// src/web/types.rs
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::{ContentType, Status};
use rocket::response::status::Custom;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};

use crate::app_log;
use crate::domain::{Application, DomainError, FilterCriteria};
use crate::repository::User;
use crate::utils::attachment_disposition;

/// Binary download with an attachment file name.
pub struct FileResponse {
    pub data: Vec<u8>,
    pub content_type: ContentType,
    pub filename: String,
}

impl FileResponse {
    pub fn csv(data: Vec<u8>, filename: String) -> Self {
        Self {
            data,
            content_type: ContentType::CSV,
            filename,
        }
    }

    pub fn pdf(data: Vec<u8>, filename: String) -> Self {
        Self {
            data,
            content_type: ContentType::PDF,
            filename,
        }
    }

    pub fn with_content_type(data: Vec<u8>, content_type: &str, filename: String) -> Self {
        Self {
            data,
            content_type: ContentType::parse_flexible(content_type).unwrap_or(ContentType::Binary),
            filename,
        }
    }
}

impl<'r> Responder<'r, 'static> for FileResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(self.content_type)
            .raw_header("Content-Disposition", attachment_disposition(&self.filename))
            .sized_body(self.data.len(), std::io::Cursor::new(self.data))
            .ok()
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
}

impl ActionResponse {
    pub fn success(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message: message.into(),
            action: action.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

pub type ApiError = Custom<Json<StandardErrorResponse>>;
pub type ApiResult<T> = Result<T, ApiError>;

pub fn api_error(status: Status, error: &str, code: &str, suggestions: &[&str]) -> ApiError {
    Custom(
        status,
        Json(StandardErrorResponse::new(
            error.to_string(),
            code.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
        )),
    )
}

pub fn not_found(what: &str) -> ApiError {
    api_error(
        Status::NotFound,
        &format!("{} not found", what),
        "NOT_FOUND",
        &["Check the id and try again"],
    )
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::EmailTaken => api_error(
                Status::Conflict,
                "An account with this email already exists",
                err.code(),
                &["Log in instead", "Use a different email"],
            ),
            _ => api_error(
                Status::BadRequest,
                &err.to_string(),
                err.code(),
                &["Fix the request and try again"],
            ),
        }
    }
}

/// Map a failure to a response: domain errors become 4xx, anything else is logged as 500.
pub fn internal_error(action: &str, err: anyhow::Error) -> ApiError {
    if let Some(domain) = err.downcast_ref::<DomainError>() {
        return domain.clone().into();
    }

    app_log!(error, "Failed to {}: {:#}", action, err);
    api_error(
        Status::InternalServerError,
        &format!("Failed to {}", action),
        "INTERNAL_ERROR",
        &["Try again in a few moments", "Contact support if the problem persists"],
    )
}

/// Month plus advanced filter parameters, shared by list, stats and exports.
#[derive(Debug, Default, FromForm)]
pub struct ApplicationQuery {
    pub month: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub job_type: Option<String>,
    pub source: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub only_favorites: Option<bool>,
}

impl ApplicationQuery {
    pub fn month(&self) -> Option<&str> {
        self.month.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    pub fn criteria(&self) -> Result<FilterCriteria, DomainError> {
        Ok(FilterCriteria {
            search: self.search.clone(),
            status: parse_choice(&self.status)?,
            job_type: parse_choice(&self.job_type)?,
            source: parse_choice(&self.source)?,
            location: self.location.clone(),
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            only_favorites: self.only_favorites.unwrap_or(false),
        })
    }
}

fn parse_choice<T>(value: &Option<String>) -> Result<Option<T>, DomainError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    match value.as_deref().map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationList {
    pub month: String,
    pub month_count: usize,
    pub items: Vec<Application>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UpcomingInterviews {
    pub today: Vec<Application>,
    pub soon: Vec<Application>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(FromForm)]
pub struct CvUploadForm<'f> {
    pub file: TempFile<'f>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct RenameCvRequest {
    pub file_name: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ParseLinkRequest {
    pub url: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct TestEmailRequest {
    pub email_type: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApplicationStatus, JobSource};

    #[test]
    fn test_query_criteria() {
        let query = ApplicationQuery {
            status: Some("offer".to_string()),
            source: Some("Otro".to_string()),
            job_type: Some("all".to_string()),
            only_favorites: Some(true),
            ..Default::default()
        };
        let criteria = query.criteria().unwrap();
        assert_eq!(criteria.status, Some(ApplicationStatus::Offer));
        assert_eq!(criteria.source, Some(JobSource::Other));
        assert_eq!(criteria.job_type, None);
        assert!(criteria.only_favorites);
    }

    #[test]
    fn test_query_rejects_unknown_status() {
        let query = ApplicationQuery {
            status: Some("ghosted".to_string()),
            ..Default::default()
        };
        let err = query.criteria().unwrap_err();
        assert_eq!(err.code(), "INVALID_VALUE");
    }

    #[test]
    fn test_blank_month_is_absent() {
        let query = ApplicationQuery {
            month: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.month(), None);
    }

    #[test]
    fn test_domain_error_maps_to_bad_request() {
        let err: ApiError = DomainError::InvalidMonth("2025-13".to_string()).into();
        assert_eq!(err.0, Status::BadRequest);
        assert_eq!(err.1.error_code, "INVALID_MONTH");

        let err = internal_error("load", anyhow::Error::new(DomainError::NothingToExport));
        assert_eq!(err.0, Status::BadRequest);

        let err = internal_error("load", anyhow::anyhow!("disk on fire"));
        assert_eq!(err.0, Status::InternalServerError);
    }

    #[test]
    fn test_email_taken_maps_to_conflict() {
        let err = internal_error("create user", anyhow::Error::new(DomainError::EmailTaken));
        assert_eq!(err.0, Status::Conflict);
        assert_eq!(err.1.error_code, "EMAIL_TAKEN");
    }
}
