//! # Runner Constants
//!
//! Status enums, lifecycle states and fixed formats shared by every part of
//! the report runner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed formats and file-level constants
pub mod system {
    /// Timestamp format used in job ids and audit log rows
    pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H-%M-%S";
    /// Run date embedded in artifact file names
    pub const RUN_DATE_FORMAT: &str = "%Y-%m-%d";
    /// Audit log header, written once when the log is created
    pub const AUDIT_LOG_HEADER: [&str; 4] = ["status", "job", "time", "notes"];
    /// Lines in the job list starting with this marker are ignored
    pub const COMMENT_MARKER: char = '#';
    /// Exit code when every job succeeded
    pub const EXIT_SUCCESS: u8 = 0;
    /// Exit code when at least one job failed
    pub const EXIT_JOB_FAILURE: u8 = 1;
    /// Exit code when setup failed and nothing was dispatched
    pub const EXIT_FATAL: u8 = 2;
}

/// Console narration stages, mirrored into structured log fields
pub mod stages {
    pub const INFO: &str = "INFO";
    pub const WARN: &str = "WARN";
    pub const FATAL: &str = "FATAL";
    pub const JOB_START: &str = "JOB-START";
    pub const DB_CONNECT: &str = "DB-CONNECT";
    pub const DB_EXEC: &str = "DB-EXEC";
    pub const DB_CLOSE: &str = "DB-CLOSE";
    pub const FILE_CSV: &str = "FILE-CSV";
    pub const FILE_ZIP: &str = "FILE-ZIP";
    pub const MAIL: &str = "MAIL";
    pub const MAIL_SENT: &str = "MAIL-SENT";
    pub const MAIL_ERROR: &str = "MAIL-ERROR";
    pub const JOB_DONE: &str = "JOB-DONE";
    pub const JOB_ERROR: &str = "JOB-ERROR";
    pub const THREAD_ERR: &str = "THREAD-ERR";
    pub const SUMMARY: &str = "SUMMARY";
}

/// Terminal status of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Success,
    Fail,
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(Self::Success),
            "FAIL" => Ok(Self::Fail),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// Process started, nothing loaded yet
    Init,
    /// Credential bundle fetched
    SecretsLoaded,
    /// Job list read (possibly empty)
    JobsLoaded,
    /// Every descriptor handed to the worker pool
    Dispatched,
    /// All outcomes collected and summarized
    Summarized,
}

impl RunState {
    /// Runs only move forward, one state at a time
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::SecretsLoaded)
                | (Self::SecretsLoaded, Self::JobsLoaded)
                | (Self::JobsLoaded, Self::Dispatched)
                | (Self::Dispatched, Self::Summarized)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Summarized)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "INIT"),
            Self::SecretsLoaded => write!(f, "SECRETS_LOADED"),
            Self::JobsLoaded => write!(f, "JOBS_LOADED"),
            Self::Dispatched => write!(f, "DISPATCHED"),
            Self::Summarized => write!(f, "SUMMARIZED"),
        }
    }
}
