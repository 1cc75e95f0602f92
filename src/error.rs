//! Error types for the report runner.
//!
//! Only [`RunnerError`] ever aborts a run. Everything that can go wrong inside
//! a single job is a [`JobError`] and ends up as that job's `FAIL` outcome;
//! mail delivery problems are a [`NotificationError`] and never touch the
//! report outcome they were notifying about.

use thiserror::Error;

/// Fatal, run-level errors. Any of these stops the run before (or instead of)
/// dispatching jobs.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Secrets unavailable: {0}")]
    SecretsUnavailable(String),
    #[error("Job list not found: {0}")]
    JobListMissing(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidState { from: String, to: String },
    #[error("Audit log error: {0}")]
    AuditLog(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for RunnerError {
    fn from(err: config::ConfigError) -> Self {
        RunnerError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;

/// Errors raised by a secrets provider. The provider chain converts the last
/// of these into [`RunnerError::SecretsUnavailable`].
#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("remote secrets store error: {0}")]
    Remote(String),
    #[error("local secrets file not found: {0}")]
    LocalFileMissing(String),
    #[error("secrets payload is not valid JSON: {0}")]
    Parse(String),
    #[error("secrets bundle is invalid: {0}")]
    Invalid(String),
    #[error("I/O error reading secrets: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SecretsError {
    fn from(err: serde_json::Error) -> Self {
        SecretsError::Parse(err.to_string())
    }
}

/// Per-job errors. The report executor turns every one of these into a
/// `FAIL` outcome whose note is the error's display text.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("SQL file not found: {0}")]
    QueryFileMissing(String),
    /// Carries the driver's native error text unchanged.
    #[error("{0}")]
    Database(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV write error: {0}")]
    Csv(String),
    #[error("ZIP archive error: {0}")]
    Archive(String),
}

impl From<sqlx::Error> for JobError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => JobError::Database(db_err.message().to_string()),
            other => JobError::Database(other.to_string()),
        }
    }
}

impl From<csv::Error> for JobError {
    fn from(err: csv::Error) -> Self {
        JobError::Csv(err.to_string())
    }
}

impl From<zip::result::ZipError> for JobError {
    fn from(err: zip::result::ZipError) -> Self {
        JobError::Archive(err.to_string())
    }
}

/// Errors from building or delivering a notification email.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("OAuth2 token refresh failed: {0}")]
    TokenRefresh(String),
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Email build error: {0}")]
    Build(String),
    #[error("Attachment error: {0}")]
    Attachment(String),
    #[error("Mail send failed: {0}")]
    Send(String),
}

impl From<lettre::error::Error> for NotificationError {
    fn from(err: lettre::error::Error) -> Self {
        NotificationError::Build(err.to_string())
    }
}
