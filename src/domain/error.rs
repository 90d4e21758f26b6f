// src/domain/error.rs
use thiserror::Error;

/// Validation failures raised by domain rules. Infrastructure failures stay `anyhow`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("salary_min ({min}) cannot be greater than salary_max ({max})")]
    InvalidSalaryRange { min: i64, max: i64 },
    #[error("{field} cannot be negative")]
    NegativeSalary { field: &'static str },
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("invalid email address")]
    InvalidEmail,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("unsupported file type, only PDF and DOC are allowed")]
    UnsupportedFileType,
    #[error("file too large, maximum is {max_mb}MB")]
    FileTooLarge { max_mb: u64 },
    #[error("nothing to export")]
    NothingToExport,
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
}

impl DomainError {
    /// Stable machine-readable code used in API error responses.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidMonth(_) => "INVALID_MONTH",
            DomainError::InvalidDate(_) => "INVALID_DATE",
            DomainError::MissingField(_) => "MISSING_FIELD",
            DomainError::InvalidSalaryRange { .. } | DomainError::NegativeSalary { .. } => {
                "INVALID_SALARY_RANGE"
            }
            DomainError::UnknownVariant { .. } => "INVALID_VALUE",
            DomainError::PasswordTooShort(_) => "PASSWORD_TOO_SHORT",
            DomainError::InvalidEmail => "INVALID_EMAIL",
            DomainError::EmailTaken => "EMAIL_TAKEN",
            DomainError::UnsupportedFileType => "UNSUPPORTED_FILE_TYPE",
            DomainError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            DomainError::NothingToExport => "NOTHING_TO_EXPORT",
            DomainError::InvalidUrl(_) => "INVALID_URL",
        }
    }
}
